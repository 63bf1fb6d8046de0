//! Finite Gaussian mixtures.
//!
//! A K-component mixture is described by parallel `weights`, `mu`
//! (means) and `tau2` (variances). Weights need not sum to one: every
//! consumer divides by their sum first.
//!
//! Two densities are provided:
//!
//! ```text
//! prior:     f(y)            = sum_j w_j N(y; mu_j, sqrt(tau2_j))
//! marginal:  f(y | sigma2_i) = sum_j w_j N(y; mu_j, sqrt(sigma2_i + tau2_j))
//! ```
//!
//! The marginal form convolves each component with the observation's own
//! Gaussian noise: a latent value is drawn from the mixture and observed
//! with additive N(0, sigma2_i) error.

use serde::{Deserialize, Serialize};

use super::error::{
    ensure_finite, ensure_noise_variances, ensure_same_len, MixtureError, MixtureResult,
};
use super::normal::normal_pdf;

/// Validated parameters of a univariate Gaussian mixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MixtureSpec", into = "MixtureSpec")]
pub struct GaussianMixture {
    weights: Vec<f64>,
    mu: Vec<f64>,
    tau2: Vec<f64>,
    normalized: Vec<f64>,
}

/// Unvalidated wire form of a mixture, as read from JSON/TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureSpec {
    pub weights: Vec<f64>,
    pub mu: Vec<f64>,
    pub tau2: Vec<f64>,
}

impl GaussianMixture {
    /// Validate mixture parameters.
    ///
    /// Requires at least one component, equal lengths, finite
    /// non-negative weights with a positive sum, and positive variances.
    pub fn new(weights: Vec<f64>, mu: Vec<f64>, tau2: Vec<f64>) -> MixtureResult<Self> {
        if weights.is_empty() {
            return Err(MixtureError::Empty { what: "weights" });
        }
        ensure_same_len("mu", weights.len(), mu.len())?;
        ensure_same_len("tau2", weights.len(), tau2.len())?;
        ensure_finite("weights", &weights)?;
        ensure_finite("mu", &mu)?;
        ensure_finite("tau2", &tau2)?;
        let normalized = normalize_weights(&weights)?;
        for (index, &value) in tau2.iter().enumerate() {
            if value <= 0.0 {
                return Err(MixtureError::NonPositiveVariance { index, value });
            }
        }
        Ok(Self {
            weights,
            mu,
            tau2,
            normalized,
        })
    }

    /// Build from borrowed slices.
    pub fn from_slices(weights: &[f64], mu: &[f64], tau2: &[f64]) -> MixtureResult<Self> {
        Self::new(weights.to_vec(), mu.to_vec(), tau2.to_vec())
    }

    /// Number of components K.
    pub fn components(&self) -> usize {
        self.weights.len()
    }

    /// Weights as supplied (not normalized).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weights divided by their sum.
    pub fn normalized_weights(&self) -> &[f64] {
        &self.normalized
    }

    pub fn means(&self) -> &[f64] {
        &self.mu
    }

    pub fn variances(&self) -> &[f64] {
        &self.tau2
    }

    /// Component standard deviations sqrt(tau2).
    pub fn std_devs(&self) -> Vec<f64> {
        self.tau2.iter().map(|v| v.sqrt()).collect()
    }

    /// Prior mixture density at a single point.
    pub fn density_at(&self, y: f64) -> f64 {
        self.marginal_density_at(y, 0.0)
    }

    /// Prior mixture density at each observation.
    pub fn density(&self, y: &[f64]) -> MixtureResult<Vec<f64>> {
        ensure_finite("y", y)?;
        Ok(y.iter().map(|&yi| self.density_at(yi)).collect())
    }

    /// Marginal density of one observation carrying noise variance `sigma2`.
    pub fn marginal_density_at(&self, y: f64, sigma2: f64) -> f64 {
        self.normalized
            .iter()
            .zip(&self.mu)
            .zip(&self.tau2)
            .map(|((&w, &m), &t2)| w * normal_pdf(y, m, (sigma2 + t2).sqrt()))
            .sum()
    }

    /// Marginal (predictive) density of each observation under its own
    /// Gaussian noise variance.
    pub fn marginal_density(&self, y: &[f64], sigma2: &[f64]) -> MixtureResult<Vec<f64>> {
        ensure_same_len("sigma2", y.len(), sigma2.len())?;
        ensure_finite("y", y)?;
        ensure_noise_variances(sigma2)?;
        Ok(y
            .iter()
            .zip(sigma2)
            .map(|(&yi, &s2)| self.marginal_density_at(yi, s2))
            .collect())
    }

    /// Unnormalized posterior weight of each component for one noisy
    /// observation: `w_j N(y; mu_j, sqrt(tau2_j + sigma2))`, written into
    /// `out` (one slot per component).
    pub fn posterior_component_weights(&self, y: f64, sigma2: f64, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.components());
        for (((dst, &w), &m), &t2) in out
            .iter_mut()
            .zip(&self.normalized)
            .zip(&self.mu)
            .zip(&self.tau2)
        {
            *dst = w * normal_pdf(y, m, (t2 + sigma2).sqrt());
        }
    }
}

impl TryFrom<MixtureSpec> for GaussianMixture {
    type Error = MixtureError;

    fn try_from(spec: MixtureSpec) -> Result<Self, Self::Error> {
        GaussianMixture::new(spec.weights, spec.mu, spec.tau2)
    }
}

impl From<GaussianMixture> for MixtureSpec {
    fn from(mixture: GaussianMixture) -> Self {
        MixtureSpec {
            weights: mixture.weights,
            mu: mixture.mu,
            tau2: mixture.tau2,
        }
    }
}

/// Divide non-negative weights by their sum.
pub fn normalize_weights(weights: &[f64]) -> MixtureResult<Vec<f64>> {
    for (index, &value) in weights.iter().enumerate() {
        if value < 0.0 {
            return Err(MixtureError::NegativeWeight { index, value });
        }
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(MixtureError::ZeroWeightSum);
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Prior density of each `y[i]` under the mixture `(weights, mu, tau2)`.
pub fn mixture_density(
    y: &[f64],
    weights: &[f64],
    mu: &[f64],
    tau2: &[f64],
) -> MixtureResult<Vec<f64>> {
    let mixture = GaussianMixture::from_slices(weights, mu, tau2)?;
    mixture.density(y)
}

/// Marginal density of each `y[i]` observed with noise variance `sigma2[i]`.
pub fn marginal_density(
    y: &[f64],
    sigma2: &[f64],
    weights: &[f64],
    mu: &[f64],
    tau2: &[f64],
) -> MixtureResult<Vec<f64>> {
    let mixture = GaussianMixture::from_slices(weights, mu, tau2)?;
    mixture.marginal_density(y, sigma2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::normal::standard_normal_pdf;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn single_component_is_plain_normal() {
        let d = mixture_density(&[0.0], &[1.0], &[0.0], &[1.0]).unwrap();
        assert!(approx_eq(d[0], 0.398_942_280_401_432_7, 1e-12));
    }

    #[test]
    fn two_component_by_hand() {
        // 0.25 N(1; 0, 1) + 0.75 N(1; 2, 2)
        let d = mixture_density(&[1.0], &[1.0, 3.0], &[0.0, 2.0], &[1.0, 4.0]).unwrap();
        let expected =
            0.25 * standard_normal_pdf(1.0) + 0.75 * standard_normal_pdf(-0.5) / 2.0;
        assert!(approx_eq(d[0], expected, 1e-12));
    }

    #[test]
    fn weight_scaling_is_invisible() {
        let y = [-1.0, 0.2, 3.0];
        let a = mixture_density(&y, &[1.0, 2.0], &[0.0, 1.0], &[1.0, 0.5]).unwrap();
        let b = mixture_density(&y, &[10.0, 20.0], &[0.0, 1.0], &[1.0, 0.5]).unwrap();
        for (x, z) in a.iter().zip(&b) {
            assert!(approx_eq(*x, *z, 1e-15));
        }
    }

    #[test]
    fn marginal_with_zero_noise_equals_prior() {
        let y = [-2.0, 0.0, 0.7];
        let prior = mixture_density(&y, &[0.3, 0.7], &[-1.0, 1.0], &[0.5, 2.0]).unwrap();
        let marg =
            marginal_density(&y, &[0.0; 3], &[0.3, 0.7], &[-1.0, 1.0], &[0.5, 2.0]).unwrap();
        for (p, m) in prior.iter().zip(&marg) {
            assert!(approx_eq(*p, *m, 1e-15));
        }
    }

    #[test]
    fn marginal_adds_noise_variance() {
        // N(0; 0, sqrt(1 + 3)) = phi(0) / 2
        let d = marginal_density(&[0.0], &[3.0], &[1.0], &[0.0], &[1.0]).unwrap();
        assert!(approx_eq(d[0], standard_normal_pdf(0.0) / 2.0, 1e-12));
    }

    #[test]
    fn shape_errors_are_reported_before_work() {
        assert_eq!(
            mixture_density(&[0.0], &[1.0, 1.0], &[0.0], &[1.0, 1.0]),
            Err(MixtureError::LengthMismatch {
                what: "mu",
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            marginal_density(&[0.0, 1.0], &[1.0], &[1.0], &[0.0], &[1.0]),
            Err(MixtureError::LengthMismatch { what: "sigma2", .. })
        ));
    }

    #[test]
    fn parameter_errors() {
        assert_eq!(
            mixture_density(&[0.0], &[0.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]),
            Err(MixtureError::ZeroWeightSum)
        );
        assert!(matches!(
            mixture_density(&[0.0], &[1.0], &[0.0], &[0.0]),
            Err(MixtureError::NonPositiveVariance { index: 0, .. })
        ));
        assert!(matches!(
            mixture_density(&[0.0], &[-1.0, 2.0], &[0.0, 1.0], &[1.0, 1.0]),
            Err(MixtureError::NegativeWeight { index: 0, .. })
        ));
        assert!(matches!(
            marginal_density(&[0.0], &[-0.5], &[1.0], &[0.0], &[1.0]),
            Err(MixtureError::NegativeNoiseVariance { index: 0, .. })
        ));
        assert_eq!(
            GaussianMixture::new(vec![], vec![], vec![]),
            Err(MixtureError::Empty { what: "weights" })
        );
    }

    #[test]
    fn non_finite_observations_are_rejected() {
        assert_eq!(
            mixture_density(&[0.0, f64::NAN], &[1.0], &[0.0], &[1.0]),
            Err(MixtureError::NonFinite { what: "y", index: 1 })
        );
        assert_eq!(
            marginal_density(&[f64::INFINITY], &[1.0], &[1.0], &[0.0], &[1.0]),
            Err(MixtureError::NonFinite { what: "y", index: 0 })
        );
        let mixture = GaussianMixture::from_slices(&[1.0], &[0.0], &[1.0]).unwrap();
        assert!(mixture.density(&[f64::NEG_INFINITY]).is_err());
    }

    #[test]
    fn posterior_weights_match_marginal_terms() {
        let mix = GaussianMixture::new(vec![1.0, 3.0], vec![-1.0, 2.0], vec![1.0, 0.5]).unwrap();
        let mut w = [0.0; 2];
        mix.posterior_component_weights(0.4, 0.25, &mut w);
        let total: f64 = w.iter().sum();
        assert!(approx_eq(total, mix.marginal_density_at(0.4, 0.25), 1e-15));
    }

    #[test]
    fn serde_round_trip_validates() {
        let json = r#"{"weights":[1.0,1.0],"mu":[0.0,2.0],"tau2":[1.0,1.0]}"#;
        let mix: GaussianMixture = serde_json::from_str(json).unwrap();
        assert_eq!(mix.normalized_weights(), &[0.5, 0.5]);
        let bad = r#"{"weights":[1.0],"mu":[0.0],"tau2":[-1.0]}"#;
        assert!(serde_json::from_str::<GaussianMixture>(bad).is_err());
    }

    #[test]
    fn extreme_inputs_underflow_to_zero() {
        let d = mixture_density(&[1e3], &[1.0], &[0.0], &[1.0]).unwrap();
        assert_eq!(d[0], 0.0);
    }
}
