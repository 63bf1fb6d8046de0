//! Normix core library
//!
//! Sampling and inference on top of the `normix-math` kernels:
//! - Categorical and Gaussian-mixture sampling, posterior component draws
//! - Newton's predictive recursion for the two-groups model, with
//!   cooperative cancellation and local false discovery rates
//! - Exit codes, logging and input parsing for the `normix` binary
//!
//! The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod recursion;
pub mod rng;
pub mod sampling;

pub use recursion::{
    predictive_recursion, replicate_shuffled, run_predictive_recursion, Interrupt,
    PredictiveRecursionFit, RecursionError, RecursionOutcome,
};
pub use rng::{seeded_rng, RandomSource};
pub use sampling::{categorical_sample, classify_component, mixture_sample, SamplingError};
