//! Sampling from discrete distributions and Gaussian mixtures.

pub mod categorical;
pub mod mixture;

pub use categorical::categorical_sample;
pub use mixture::{
    classify_component, classify_observations, mixture_sample, sample_mixture,
};

use normix_math::MixtureError;
use thiserror::Error;

/// Errors from the samplers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] MixtureError),

    #[error("all component weights underflowed to zero for observation {observation}")]
    DegenerateWeights { observation: usize },
}
