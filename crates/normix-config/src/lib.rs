//! Normix configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for recursion, grid, and simulation settings
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{load_config, resolve_config_path, ConfigSource, ResolvedConfig};
pub use settings::{GridSettings, NormixConfig, RecursionSettings, SimulationSettings};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
