//! Normix math kernels.
//!
//! Pure numeric building blocks shared by the samplers and the
//! predictive recursion: the normal density, grid-valued densities with
//! trapezoid integration, and finite Gaussian mixture densities.

pub mod math;

pub use math::error::{MixtureError, MixtureResult};
pub use math::grid::{trapezoid, Grid};
pub use math::mixture::{
    marginal_density, mixture_density, normalize_weights, GaussianMixture, MixtureSpec,
};
pub use math::normal::{normal_pdf, normal_pdf_into, standard_normal_pdf};
