//! Reading numeric inputs for the CLI.
//!
//! Value lists are either a JSON array of numbers or plain text with one
//! number per line (whitespace and commas also separate). Mixtures are
//! JSON objects `{"weights": [..], "mu": [..], "tau2": [..]}`.

use normix_math::{GaussianMixture, MixtureError, MixtureSpec};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid mixture in {path}: {source}")]
    Mixture {
        path: PathBuf,
        #[source]
        source: MixtureError,
    },
}

/// Read a list of numbers from `path`.
pub fn read_values(path: &Path) -> Result<Vec<f64>, InputError> {
    let text = read_text(path)?;
    parse_values(&text).map_err(|message| InputError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Read and validate a mixture from a JSON file.
pub fn read_mixture(path: &Path) -> Result<GaussianMixture, InputError> {
    let text = read_text(path)?;
    let spec: MixtureSpec = serde_json::from_str(&text).map_err(|e| InputError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    GaussianMixture::try_from(spec).map_err(|source| InputError::Mixture {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a JSON array or separator-delimited list of numbers.
pub fn parse_values(text: &str) -> Result<Vec<f64>, String> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| e.to_string());
    }
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<f64>()
                .map_err(|e| format!("value {} ({token:?}): {e}", i + 1))
        })
        .collect()
}

fn read_text(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
