//! normix - normal mixtures and empirical-Bayes local FDR
//!
//! The entry point for the normix CLI, handling:
//! - Mixture densities with and without per-observation noise
//! - Mixture sampling and posterior component draws
//! - Predictive recursion fits with local false discovery rates

use clap::{Args, Parser, Subcommand};
use normix_config::{
    load_config, validate_config, ResolvedConfig, ValidationError, CONFIG_SCHEMA_VERSION,
};
use normix_core::exit_codes::ExitCode;
use normix_core::input::{read_mixture, read_values, InputError};
use normix_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use normix_core::recursion::{
    replicate_shuffled, run_predictive_recursion, Deadline, RecursionError, RecursionOutcome,
};
use normix_core::rng::{random_seed, seeded_rng};
use normix_core::sampling::{classify_observations, sample_mixture, SamplingError};
use normix_math::{Grid, MixtureError};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info_span};

/// Normal mixtures, component classification and predictive recursion
#[derive(Parser)]
#[command(name = "normix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Configuration file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Abort the recursion once this many seconds have passed
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// RNG seed; overrides simulation.seed from the configuration
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the mixture density at each value
    Density(DensityArgs),

    /// Evaluate the noisy marginal density at each value
    Marginal(NoisyArgs),

    /// Draw values from a mixture
    Sample(SampleArgs),

    /// Draw a generating component for each noisy value
    Classify(NoisyArgs),

    /// Fit a two-groups model by predictive recursion
    Fit(FitArgs),
}

#[derive(Args, Debug)]
struct DensityArgs {
    /// Mixture JSON: {"weights": [..], "mu": [..], "tau2": [..]}
    #[arg(long)]
    mixture: PathBuf,

    /// Values to evaluate (JSON array or one number per line)
    #[arg(long)]
    values: PathBuf,
}

#[derive(Args, Debug)]
struct NoisyArgs {
    /// Mixture JSON: {"weights": [..], "mu": [..], "tau2": [..]}
    #[arg(long)]
    mixture: PathBuf,

    /// Observed values
    #[arg(long)]
    values: PathBuf,

    /// Noise variance of each observed value
    #[arg(long)]
    noise: PathBuf,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Mixture JSON: {"weights": [..], "mu": [..], "tau2": [..]}
    #[arg(long)]
    mixture: PathBuf,

    /// Number of draws
    #[arg(short = 'n', long)]
    count: usize,
}

#[derive(Args, Debug)]
struct FitArgs {
    /// z-statistics
    #[arg(long)]
    values: PathBuf,

    /// Shuffled copies of the data fed to the recursion
    #[arg(long)]
    replicates: Option<usize>,

    /// Initial null probability
    #[arg(long)]
    nullprob: Option<f64>,

    /// Step-size exponent
    #[arg(long, allow_hyphen_values = true)]
    decay: Option<f64>,
}

/// Common envelope around every payload written to stdout.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    run_id: &'a str,
    generated_at: String,
    command: &'static str,
    #[serde(flatten)]
    payload: T,
}

struct RunContext {
    run_id: String,
    config: ResolvedConfig,
}

impl RunContext {
    fn emit<T: Serialize>(&self, command: &'static str, payload: T) -> ExitCode {
        let envelope = Envelope {
            schema_version: CONFIG_SCHEMA_VERSION,
            run_id: &self.run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            command,
            payload,
        };
        match serde_json::to_string_pretty(&envelope) {
            Ok(json) => {
                println!("{json}");
                ExitCode::Clean
            }
            Err(e) => fail(ExitCode::InternalError, &e),
        }
    }

    fn seed(&self, global: &GlobalOpts) -> u64 {
        global
            .seed
            .or(self.config.config.simulation.seed)
            .unwrap_or_else(random_seed)
    }
}

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        cli.global.log_level
    };
    let log_config = LogConfig::from_env(cli_level, cli.global.log_format);
    init_logging(&log_config);

    let run_id = generate_run_id();
    let span = info_span!("normix", run_id = %run_id);
    let _enter = span.enter();

    let config = match load_config(cli.global.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(config_error(e).as_i32()),
    };
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        seed = ?cli.global.seed,
        timeout = ?cli.global.timeout,
        "normix starting"
    );

    let ctx = RunContext { run_id, config };
    let exit_code = match &cli.command {
        Commands::Density(args) => run_density(&ctx, args),
        Commands::Marginal(args) => run_marginal(&ctx, args),
        Commands::Sample(args) => run_sample(&ctx, &cli.global, args),
        Commands::Classify(args) => run_classify(&ctx, &cli.global, args),
        Commands::Fit(args) => run_fit(&ctx, &cli.global, args),
    };

    std::process::exit(exit_code.as_i32());
}

/// Report an error on stderr and return its exit code.
fn fail(code: ExitCode, err: &dyn std::fmt::Display) -> ExitCode {
    report(code, err, None)
}

fn report(code: ExitCode, err: &dyn std::fmt::Display, detail_code: Option<u32>) -> ExitCode {
    error!(code = code.code_name(), detail_code, "{err}");
    let mut error = serde_json::json!({
        "code": code.code_name(),
        "exit_code": code.as_i32(),
        "message": err.to_string(),
    });
    if let Some(detail) = detail_code {
        error["detail_code"] = detail.into();
    }
    let response = serde_json::json!({ "status": "error", "error": error });
    eprintln!("{response}");
    code
}

/// Configuration failures also carry the validator's own error code.
fn config_error(err: ValidationError) -> ExitCode {
    report(ExitCode::from(&err), &err, Some(err.code()))
}

fn input_error(err: InputError) -> ExitCode {
    fail(ExitCode::from(&err), &err)
}

fn mixture_error(err: MixtureError) -> ExitCode {
    fail(ExitCode::InvalidInput, &err)
}

fn sampling_error(err: SamplingError) -> ExitCode {
    fail(ExitCode::from(&err), &err)
}

fn recursion_error(err: RecursionError) -> ExitCode {
    fail(ExitCode::from(&err), &err)
}

fn run_density(ctx: &RunContext, args: &DensityArgs) -> ExitCode {
    let mixture = match read_mixture(&args.mixture) {
        Ok(m) => m,
        Err(e) => return input_error(e),
    };
    let values = match read_values(&args.values) {
        Ok(v) => v,
        Err(e) => return input_error(e),
    };
    match mixture.density(&values) {
        Ok(density) => ctx.emit(
            "density",
            serde_json::json!({ "values": values, "density": density }),
        ),
        Err(e) => mixture_error(e),
    }
}

fn run_marginal(ctx: &RunContext, args: &NoisyArgs) -> ExitCode {
    let (mixture, values, noise) = match read_noisy(args) {
        Ok(inputs) => inputs,
        Err(e) => return input_error(e),
    };
    match mixture.marginal_density(&values, &noise) {
        Ok(density) => ctx.emit(
            "marginal",
            serde_json::json!({ "values": values, "density": density }),
        ),
        Err(e) => mixture_error(e),
    }
}

fn run_sample(ctx: &RunContext, global: &GlobalOpts, args: &SampleArgs) -> ExitCode {
    let mixture = match read_mixture(&args.mixture) {
        Ok(m) => m,
        Err(e) => return input_error(e),
    };
    let seed = ctx.seed(global);
    let draws = sample_mixture(&mixture, args.count, &mut seeded_rng(seed));
    ctx.emit("sample", serde_json::json!({ "seed": seed, "draws": draws }))
}

fn run_classify(ctx: &RunContext, global: &GlobalOpts, args: &NoisyArgs) -> ExitCode {
    let (mixture, values, noise) = match read_noisy(args) {
        Ok(inputs) => inputs,
        Err(e) => return input_error(e),
    };
    let seed = ctx.seed(global);
    match classify_observations(&mixture, &values, &noise, &mut seeded_rng(seed)) {
        Ok(components) => ctx.emit(
            "classify",
            serde_json::json!({ "seed": seed, "components": components }),
        ),
        Err(e) => sampling_error(e),
    }
}

fn read_noisy(
    args: &NoisyArgs,
) -> Result<(normix_math::GaussianMixture, Vec<f64>, Vec<f64>), InputError> {
    Ok((
        read_mixture(&args.mixture)?,
        read_values(&args.values)?,
        read_values(&args.noise)?,
    ))
}

fn run_fit(ctx: &RunContext, global: &GlobalOpts, args: &FitArgs) -> ExitCode {
    let mut config = ctx.config.config.clone();
    if let Some(nullprob) = args.nullprob {
        config.recursion.nullprob = nullprob;
    }
    if let Some(decay) = args.decay {
        config.recursion.decay = decay;
    }
    if let Some(replicates) = args.replicates {
        config.simulation.replicates = replicates;
    }
    if let Err(e) = validate_config(&config) {
        return config_error(e);
    }

    let z = match read_values(&args.values) {
        Ok(v) => v,
        Err(e) => return input_error(e),
    };
    let grid = match Grid::linspace(config.grid.lower, config.grid.upper, config.grid.points) {
        Ok(g) => g,
        Err(e) => return fail(ExitCode::ArgsError, &e),
    };
    let theta_guess = grid.uniform_density();

    let seed = ctx.seed(global);
    let stream = replicate_shuffled(&z, config.simulation.replicates, &mut seeded_rng(seed));
    let deadline = global.timeout.map(|secs| Deadline::after(Duration::from_secs(secs)));

    let outcome =
        match run_predictive_recursion(&stream, &grid, &theta_guess, &config.recursion, &deadline) {
            Ok(outcome) => outcome,
            Err(e) => return recursion_error(e),
        };

    let fit = match outcome {
        RecursionOutcome::Completed(fit) => fit,
        RecursionOutcome::Aborted { processed } => {
            let payload = serde_json::json!({
                "status": "aborted",
                "processed": processed,
                "total": stream.len(),
            });
            return match ctx.emit("fit", payload) {
                ExitCode::Clean => ExitCode::Aborted,
                other => other,
            };
        }
    };

    let local_fdr = match fit.local_fdr(&z) {
        Ok(v) => v,
        Err(e) => return recursion_error(e),
    };
    let payload = serde_json::json!({
        "status": "completed",
        "seed": seed,
        "replicates": config.simulation.replicates,
        "config_source": ctx.config.source.to_string(),
        "fit": &fit,
        "local_fdr_grid": fit.local_fdr_on_grid(),
        "local_fdr": local_fdr,
    });
    ctx.emit("fit", payload)
}
