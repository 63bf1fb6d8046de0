//! Newton's predictive recursion for a two-groups model.
//!
//! # Background
//!
//! Observations follow `z ~ pi0 N(mu0, sig0) + (1 - pi0) f1`, where the
//! alternative `f1` is a location mixture of `N(theta, sig0)` kernels over an
//! unknown density of `theta`. The recursion makes one pass over the data
//! and nudges both the null probability and a grid-valued sub-density of
//! `theta` toward the posterior implied by each new observation.
//!
//! # Update
//!
//! For observation `i` with step size `c_i = (1 + i)^decay`:
//!
//! ```text
//! joint(x) = N(x; z_i, sig0) * theta(x)         for every grid point x
//! m0       = pi0 * N(z_i; mu0, sig0)
//! m1       = trapezoid(grid, joint)
//! pi0      <- (1 - c_i) pi0      + c_i m0 / (m0 + m1)
//! theta(x) <- (1 - c_i) theta(x) + c_i joint(x) / (m0 + m1)
//! ```
//!
//! Memory is O(grid size) regardless of the number of observations. The
//! trajectory depends on the order of `z`, so callers usually feed several
//! shuffled replicates (see [`super::replicate`]).

use normix_config::validate::validate_recursion;
use normix_config::{RecursionSettings, ValidationError};
use normix_math::math::error::{ensure_finite, ensure_same_len};
use normix_math::{normal_pdf, normal_pdf_into, Grid, MixtureError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::fit::PredictiveRecursionFit;
use super::interrupt::Interrupt;

/// Errors from the predictive recursion.
#[derive(Debug, Error)]
pub enum RecursionError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] MixtureError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ValidationError),

    #[error("mixture density underflowed to zero at observation {index} (z = {observation})")]
    NumericDegeneracy { index: usize, observation: f64 },
}

/// Mutable state threaded through one sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecursionState {
    /// Current null probability estimate.
    pub pi0: f64,
    /// Current alternative sub-density, one value per grid point.
    pub theta_subdens: Vec<f64>,
}

/// Result of a recursion call.
///
/// An aborted sweep is a normal outcome, not an error; it carries no
/// partial estimate.
#[derive(Debug, Clone)]
pub enum RecursionOutcome {
    Completed(PredictiveRecursionFit),
    Aborted { processed: usize },
}

impl RecursionOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RecursionOutcome::Aborted { .. })
    }

    pub fn into_fit(self) -> Option<PredictiveRecursionFit> {
        match self {
            RecursionOutcome::Completed(fit) => Some(fit),
            RecursionOutcome::Aborted { .. } => None,
        }
    }
}

enum SweepStatus {
    Finished(RecursionState),
    Aborted { processed: usize },
}

/// Run the predictive recursion over raw grid points.
///
/// `theta_guess` is copied; the caller's slice is never modified.
pub fn predictive_recursion<I: Interrupt + ?Sized>(
    z: &[f64],
    grid_x: &[f64],
    theta_guess: &[f64],
    settings: &RecursionSettings,
    interrupt: &I,
) -> Result<RecursionOutcome, RecursionError> {
    let grid = Grid::new(grid_x.to_vec())?;
    run_predictive_recursion(z, &grid, theta_guess, settings, interrupt)
}

/// Run the predictive recursion on a validated grid.
pub fn run_predictive_recursion<I: Interrupt + ?Sized>(
    z: &[f64],
    grid: &Grid,
    theta_guess: &[f64],
    settings: &RecursionSettings,
    interrupt: &I,
) -> Result<RecursionOutcome, RecursionError> {
    validate_recursion(settings)?;
    ensure_same_len("theta_guess", grid.len(), theta_guess.len())?;
    ensure_finite("theta_guess", theta_guess)?;
    if let Some(index) = theta_guess.iter().position(|&v| v < 0.0) {
        return Err(MixtureError::NegativeDensity {
            index,
            value: theta_guess[index],
        }
        .into());
    }
    ensure_finite("z", z)?;

    debug!(
        observations = z.len(),
        grid_points = grid.len(),
        nullprob = settings.nullprob,
        mu0 = settings.mu0,
        sig0 = settings.sig0,
        decay = settings.decay,
        "starting predictive recursion"
    );

    let state = RecursionState {
        pi0: settings.nullprob,
        theta_subdens: theta_guess.to_vec(),
    };

    let state = match sweep(state, z, grid, settings, interrupt)? {
        SweepStatus::Finished(state) => state,
        SweepStatus::Aborted { processed } => {
            info!(
                processed,
                total = z.len(),
                "predictive recursion aborted"
            );
            return Ok(RecursionOutcome::Aborted { processed });
        }
    };

    let (y_mix, y_signal) = evaluate_on_grid(&state, grid, settings);
    if state.pi0 >= 1.0 {
        warn!(pi0 = state.pi0, "no mass left for the alternative; y_signal is not finite");
    }
    info!(
        observations = z.len(),
        pi0 = state.pi0,
        "predictive recursion complete"
    );

    Ok(RecursionOutcome::Completed(PredictiveRecursionFit {
        grid_x: grid.clone(),
        theta_subdens: state.theta_subdens,
        pi0: state.pi0,
        y_mix,
        y_signal,
        mu0: settings.mu0,
        sig0: settings.sig0,
        observations: z.len(),
    }))
}

/// One linear pass over `z`, consuming and returning the state.
fn sweep<I: Interrupt + ?Sized>(
    mut state: RecursionState,
    z: &[f64],
    grid: &Grid,
    settings: &RecursionSettings,
    interrupt: &I,
) -> Result<SweepStatus, RecursionError> {
    let mut joint = vec![0.0; grid.len()];

    for (i, &zi) in z.iter().enumerate() {
        if i % settings.cancel_check_interval == 0 {
            trace!(processed = i, pi0 = state.pi0, "cancellation checkpoint");
            if interrupt.should_cancel() {
                return Ok(SweepStatus::Aborted { processed: i });
            }
        }

        let cc = (1.0 + i as f64).powf(settings.decay);
        let (m0, m1) = mixture_terms(
            grid,
            &state.theta_subdens,
            state.pi0,
            zi,
            settings.mu0,
            settings.sig0,
            &mut joint,
        );
        let mmix = m0 + m1;
        if !mmix.is_finite() || mmix <= 0.0 {
            return Err(RecursionError::NumericDegeneracy {
                index: i,
                observation: zi,
            });
        }

        state.pi0 = (1.0 - cc) * state.pi0 + cc * (m0 / mmix);
        for (theta, &j) in state.theta_subdens.iter_mut().zip(&joint) {
            *theta = (1.0 - cc) * *theta + cc * (j / mmix);
        }
    }

    Ok(SweepStatus::Finished(state))
}

/// Fitted marginal and signal densities with each grid point as the statistic.
fn evaluate_on_grid(
    state: &RecursionState,
    grid: &Grid,
    settings: &RecursionSettings,
) -> (Vec<f64>, Vec<f64>) {
    let mut joint = vec![0.0; grid.len()];
    let mut y_mix = Vec::with_capacity(grid.len());
    let mut y_signal = Vec::with_capacity(grid.len());
    for &x in grid.as_slice() {
        let (m0, m1) = mixture_terms(
            grid,
            &state.theta_subdens,
            state.pi0,
            x,
            settings.mu0,
            settings.sig0,
            &mut joint,
        );
        y_mix.push(m0 + m1);
        y_signal.push(m1 / (1.0 - state.pi0));
    }
    (y_mix, y_signal)
}

/// Null and alternative terms of the fitted marginal at statistic `z`.
///
/// Fills `joint[j] = N(grid[j]; z, sig0) * theta[j]` and returns
/// `(pi0 N(z; mu0, sig0), trapezoid(grid, joint))`.
pub(crate) fn mixture_terms(
    grid: &Grid,
    theta: &[f64],
    pi0: f64,
    z: f64,
    mu0: f64,
    sig0: f64,
    joint: &mut [f64],
) -> (f64, f64) {
    normal_pdf_into(grid.as_slice(), z, sig0, joint);
    for (dst, &t) in joint.iter_mut().zip(theta) {
        *dst *= t;
    }
    let m0 = pi0 * normal_pdf(z, mu0, sig0);
    let m1 = grid.integrate(joint);
    (m0, m1)
}
