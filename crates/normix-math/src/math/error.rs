//! Input validation errors for mixture and grid kernels.

use thiserror::Error;

/// Errors raised when mixture parameters, observations, or grids are
/// malformed. All of them are detected before any computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MixtureError {
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    #[error("weight {index} is negative: {value}")]
    NegativeWeight { index: usize, value: f64 },

    #[error("weights must have a strictly positive sum")]
    ZeroWeightSum,

    #[error("component variance {index} must be positive, got {value}")]
    NonPositiveVariance { index: usize, value: f64 },

    #[error("density value {index} is negative: {value}")]
    NegativeDensity { index: usize, value: f64 },

    #[error("noise variance {index} must be non-negative, got {value}")]
    NegativeNoiseVariance { index: usize, value: f64 },

    #[error("{what}[{index}] is not finite")]
    NonFinite { what: &'static str, index: usize },

    #[error("need at least {needed} points, got {actual}")]
    TooFewPoints { needed: usize, actual: usize },

    #[error("grid must be strictly increasing (violated at index {index})")]
    GridNotAscending { index: usize },
}

/// Result alias for mixture kernels.
pub type MixtureResult<T> = Result<T, MixtureError>;

/// Check that `actual` has the length of the reference sequence.
pub fn ensure_same_len(what: &'static str, expected: usize, actual: usize) -> MixtureResult<()> {
    if expected != actual {
        return Err(MixtureError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Check that every value is finite.
pub fn ensure_finite(what: &'static str, values: &[f64]) -> MixtureResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(MixtureError::NonFinite { what, index }),
        None => Ok(()),
    }
}

/// Check that observation-level noise variances are finite and non-negative.
pub fn ensure_noise_variances(sigma2: &[f64]) -> MixtureResult<()> {
    ensure_finite("sigma2", sigma2)?;
    for (index, &value) in sigma2.iter().enumerate() {
        if value < 0.0 {
            return Err(MixtureError::NegativeNoiseVariance { index, value });
        }
    }
    Ok(())
}
