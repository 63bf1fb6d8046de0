//! Logging configuration.
//!
//! Resolution order, highest first:
//! - CLI flags (--log-level, --log-format, --quiet)
//! - NORMIX_LOG / NORMIX_LOG_FORMAT / NORMIX_LOG_TIMESTAMPS
//! - RUST_LOG (level only)
//! - defaults (human format, info level)

use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "structured" | "machine" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug information.
    Debug,
    /// Standard operational info (default).
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
    /// Completely silent.
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" | "quiet" => Ok(LogLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "NORMIX_LOG";

/// Environment variable holding the log format.
pub const ENV_LOG_FORMAT: &str = "NORMIX_LOG_FORMAT";

/// Environment variable that turns timestamps in human output off
/// (`0`, `false`, `no` or `off`).
pub const ENV_LOG_TIMESTAMPS: &str = "NORMIX_LOG_TIMESTAMPS";

/// Raw logging settings read from the environment.
#[derive(Debug, Clone, Default)]
struct LogEnv {
    level: Option<String>,
    rust_log: Option<String>,
    format: Option<String>,
    timestamps: Option<String>,
}

impl LogEnv {
    fn capture() -> Self {
        LogEnv {
            level: std::env::var(ENV_LOG_LEVEL).ok(),
            rust_log: std::env::var("RUST_LOG").ok(),
            format: std::env::var(ENV_LOG_FORMAT).ok(),
            timestamps: std::env::var(ENV_LOG_TIMESTAMPS).ok(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Minimum log level.
    pub level: LogLevel,
    /// Whether to include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::resolve(&LogEnv::capture(), cli_level, cli_format)
    }

    fn resolve(env: &LogEnv, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        let mut config = LogConfig::default();

        // NORMIX_LOG takes precedence over RUST_LOG
        if let Some(val) = env.level.as_deref() {
            if let Ok(level) = val.parse::<LogLevel>() {
                config.level = level;
            }
        } else if let Some(val) = env.rust_log.as_deref() {
            // Coarse: the most verbose level mentioned anywhere wins
            if val.contains("trace") {
                config.level = LogLevel::Trace;
            } else if val.contains("debug") {
                config.level = LogLevel::Debug;
            } else if val.contains("warn") {
                config.level = LogLevel::Warn;
            } else if val.contains("error") {
                config.level = LogLevel::Error;
            }
        }

        if let Some(format) = env.format.as_deref().and_then(|v| v.parse::<LogFormat>().ok()) {
            config.format = format;
        }
        if let Some(val) = env.timestamps.as_deref() {
            config.timestamps = !matches!(
                val.trim().to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        if let Some(level) = cli_level {
            config.level = level;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }

        config
    }

    /// Filter directive covering the workspace crates.
    pub fn filter_directive(&self) -> String {
        ["normix", "normix_core", "normix_math", "normix_config"]
            .iter()
            .map(|target| format!("{target}={}", self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}
