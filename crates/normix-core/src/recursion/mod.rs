//! Predictive recursion estimate of a two-groups model.

pub mod engine;
pub mod fit;
pub mod interrupt;
pub mod replicate;

pub use engine::{
    predictive_recursion, run_predictive_recursion, RecursionError, RecursionOutcome,
    RecursionState,
};
pub use fit::PredictiveRecursionFit;
pub use interrupt::{Deadline, Interrupt, NeverCancel};
pub use replicate::replicate_shuffled;
