//! Drawing from a Gaussian mixture and posterior component assignment.

use normix_math::math::error::{ensure_finite, ensure_noise_variances, ensure_same_len};
use normix_math::GaussianMixture;
use tracing::debug;

use super::categorical::draw_index;
use super::SamplingError;
use crate::rng::RandomSource;

/// Draw `n` values from `mixture`.
///
/// Each draw picks a component with the categorical sampler, then one
/// normal value with that component's mean and standard deviation.
pub fn sample_mixture<R: RandomSource + ?Sized>(
    mixture: &GaussianMixture,
    n: usize,
    rng: &mut R,
) -> Vec<f64> {
    let sd = mixture.std_devs();
    let mu = mixture.means();
    (0..n)
        .map(|_| {
            let j = draw_index(mixture.weights(), rng);
            rng.normal(mu[j], sd[j])
        })
        .collect()
}

/// Draw `n` values from the mixture `(weights, mu, tau2)`.
pub fn mixture_sample<R: RandomSource + ?Sized>(
    n: usize,
    weights: &[f64],
    mu: &[f64],
    tau2: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>, SamplingError> {
    let mixture = GaussianMixture::from_slices(weights, mu, tau2)?;
    Ok(sample_mixture(&mixture, n, rng))
}

/// Draw a generating component for every noisy observation.
///
/// Observation `i` gets component `j` with probability proportional to
/// `w_j N(y_i; mu_j, sqrt(tau2_j + sigma2_i))`. This is a posterior draw,
/// not an argmax: two calls with different random streams can disagree.
pub fn classify_observations<R: RandomSource + ?Sized>(
    mixture: &GaussianMixture,
    y: &[f64],
    sigma2: &[f64],
    rng: &mut R,
) -> Result<Vec<usize>, SamplingError> {
    ensure_same_len("sigma2", y.len(), sigma2.len())?;
    ensure_finite("y", y)?;
    ensure_noise_variances(sigma2)?;
    debug!(
        observations = y.len(),
        components = mixture.components(),
        "classifying observations"
    );

    let mut posterior = vec![0.0; mixture.components()];
    let mut assignments = Vec::with_capacity(y.len());
    for (i, (&yi, &s2)) in y.iter().zip(sigma2).enumerate() {
        mixture.posterior_component_weights(yi, s2, &mut posterior);
        let total: f64 = posterior.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(SamplingError::DegenerateWeights { observation: i });
        }
        assignments.push(draw_index(&posterior, rng));
    }
    Ok(assignments)
}

/// Draw a generating component (0-based) for every `(y[i], sigma2[i])`
/// under the mixture `(weights, mu, tau2)`.
pub fn classify_component<R: RandomSource + ?Sized>(
    y: &[f64],
    sigma2: &[f64],
    weights: &[f64],
    mu: &[f64],
    tau2: &[f64],
    rng: &mut R,
) -> Result<Vec<usize>, SamplingError> {
    let mixture = GaussianMixture::from_slices(weights, mu, tau2)?;
    classify_observations(&mixture, y, sigma2, rng)
}
