//! Configuration validation errors and semantic validation.

use thiserror::Error;
use tracing::warn;

use crate::settings::{GridSettings, NormixConfig, RecursionSettings, SimulationSettings};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

/// Validate a full configuration document semantically.
pub fn validate_config(config: &NormixConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_recursion(&config.recursion)?;
    validate_grid(&config.grid)?;
    validate_simulation(&config.simulation)?;
    Ok(())
}

/// Validate predictive recursion parameters.
pub fn validate_recursion(settings: &RecursionSettings) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&settings.nullprob) {
        return Err(invalid(
            "recursion.nullprob",
            format!("Must be in [0, 1], got {}", settings.nullprob),
        ));
    }
    if !settings.mu0.is_finite() {
        return Err(invalid(
            "recursion.mu0",
            format!("Must be finite, got {}", settings.mu0),
        ));
    }
    if !settings.sig0.is_finite() || settings.sig0 <= 0.0 {
        return Err(invalid(
            "recursion.sig0",
            format!("Must be positive, got {}", settings.sig0),
        ));
    }
    if !settings.decay.is_finite() || settings.decay >= 0.0 {
        return Err(invalid(
            "recursion.decay",
            format!("Must be negative, got {}", settings.decay),
        ));
    }
    if settings.decay <= -1.0 || settings.decay >= -2.0 / 3.0 {
        warn!(
            decay = settings.decay,
            "recursion.decay outside (-1, -2/3); convergence is not guaranteed"
        );
    }
    if settings.cancel_check_interval == 0 {
        return Err(invalid(
            "recursion.cancel_check_interval",
            "Must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validate grid bounds and resolution.
pub fn validate_grid(settings: &GridSettings) -> ValidationResult<()> {
    if !settings.lower.is_finite() || !settings.upper.is_finite() {
        return Err(invalid(
            "grid",
            format!(
                "Bounds must be finite, got [{}, {}]",
                settings.lower, settings.upper
            ),
        ));
    }
    if settings.lower >= settings.upper {
        return Err(invalid(
            "grid.lower",
            format!(
                "Must be below grid.upper ({} >= {})",
                settings.lower, settings.upper
            ),
        ));
    }
    if settings.points < 2 {
        return Err(invalid(
            "grid.points",
            format!("Must be at least 2, got {}", settings.points),
        ));
    }
    Ok(())
}

/// Validate simulation settings.
pub fn validate_simulation(settings: &SimulationSettings) -> ValidationResult<()> {
    if settings.replicates == 0 {
        return Err(invalid(
            "simulation.replicates",
            "Must be at least 1".to_string(),
        ));
    }
    Ok(())
}
