//! Settings for the predictive recursion, its grid, and simulation runs.
//!
//! Every section has serde defaults, so an empty file (or no file at all)
//! yields the stock configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormixConfig {
    /// Schema version for compatibility checking.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub recursion: RecursionSettings,

    #[serde(default)]
    pub grid: GridSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Default for NormixConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            recursion: RecursionSettings::default(),
            grid: GridSettings::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

/// Predictive recursion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecursionSettings {
    /// Initial guess for the null probability pi0.
    #[serde(default = "default_nullprob")]
    pub nullprob: f64,

    /// Mean of the (fixed) null component.
    #[serde(default)]
    pub mu0: f64,

    /// Standard deviation of the null component and of the observation kernel.
    #[serde(default = "default_sig0")]
    pub sig0: f64,

    /// Step-size exponent: the i-th update uses (1 + i)^decay.
    /// Convergence theory wants a value in (-1, -2/3).
    #[serde(default = "default_decay")]
    pub decay: f64,

    /// Observations between cooperative cancellation checks.
    #[serde(default = "default_cancel_check_interval")]
    pub cancel_check_interval: usize,
}

fn default_nullprob() -> f64 {
    0.95
}

fn default_sig0() -> f64 {
    1.0
}

fn default_decay() -> f64 {
    -0.67
}

fn default_cancel_check_interval() -> usize {
    200
}

impl Default for RecursionSettings {
    fn default() -> Self {
        Self {
            nullprob: default_nullprob(),
            mu0: 0.0,
            sig0: default_sig0(),
            decay: default_decay(),
            cancel_check_interval: default_cancel_check_interval(),
        }
    }
}

/// Evenly spaced grid on which the alternative density is represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    #[serde(default = "default_grid_lower")]
    pub lower: f64,

    #[serde(default = "default_grid_upper")]
    pub upper: f64,

    #[serde(default = "default_grid_points")]
    pub points: usize,
}

fn default_grid_lower() -> f64 {
    -4.0
}

fn default_grid_upper() -> f64 {
    4.0
}

fn default_grid_points() -> usize {
    41
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            lower: default_grid_lower(),
            upper: default_grid_upper(),
            points: default_grid_points(),
        }
    }
}

/// Randomness controls for sampling and for ordering recursion input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// RNG seed; `None` draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of shuffled copies of the observations fed to the recursion.
    #[serde(default = "default_replicates")]
    pub replicates: usize,
}

fn default_replicates() -> usize {
    1
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            replicates: default_replicates(),
        }
    }
}

impl NormixConfig {
    /// Load from a file. `.json` files are parsed as JSON, everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }
}
