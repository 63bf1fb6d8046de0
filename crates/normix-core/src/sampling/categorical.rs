//! Inverse-CDF draw from a discrete distribution.
//!
//! Linear scan over the running sum of the weights: O(K) per draw, which
//! is what mixture-sized K calls for.

use normix_math::math::error::ensure_finite;
use normix_math::MixtureError;

use super::SamplingError;
use crate::rng::RandomSource;

/// Draw an index in `[0, K)` with probability proportional to `weights[k]`.
///
/// Weights need not sum to one but must be finite, non-negative, and have
/// a positive sum. Consumes exactly one uniform draw.
pub fn categorical_sample<R: RandomSource + ?Sized>(
    weights: &[f64],
    rng: &mut R,
) -> Result<usize, SamplingError> {
    if weights.is_empty() {
        return Err(MixtureError::Empty { what: "weights" }.into());
    }
    ensure_finite("weights", weights)?;
    if let Some(index) = weights.iter().position(|&w| w < 0.0) {
        return Err(MixtureError::NegativeWeight {
            index,
            value: weights[index],
        }
        .into());
    }
    if running_total(weights) <= 0.0 {
        return Err(MixtureError::ZeroWeightSum.into());
    }
    Ok(draw_index(weights, rng))
}

/// Unchecked draw used by callers that validated `weights` already.
///
/// `u` is uniform on `(0, total]`; the result is the smallest `k` whose
/// cumulative weight reaches `u`, so zero-weight entries are never chosen.
pub(crate) fn draw_index<R: RandomSource + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let total = running_total(weights);
    let u = total - rng.uniform(0.0, total);
    let mut cumsum = 0.0;
    for (k, &w) in weights.iter().enumerate() {
        cumsum += w;
        if cumsum >= u {
            return k;
        }
    }
    // Unreachable with the same summation order; keep the last live index.
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(weights.len() - 1)
}

fn running_total(weights: &[f64]) -> f64 {
    weights.iter().fold(0.0, |acc, w| acc + w)
}
