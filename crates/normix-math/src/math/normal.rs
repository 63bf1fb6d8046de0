//! Normal (Gaussian) density kernels.
//!
//! Densities are evaluated in the linear domain with the closed form
//! `exp(-z^2 / 2) / (sd * sqrt(2*pi))`. Nothing is computed in log space,
//! so densities far in the tails underflow to exactly `0.0`. Callers that
//! divide by a density (the predictive recursion, the classifier) check
//! for that case themselves.

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7; // 1 / sqrt(2*pi)

/// Standard normal density phi(z).
#[inline]
pub fn standard_normal_pdf(z: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * z * z).exp()
}

/// Normal density N(x; mean, sd).
///
/// Returns NaN for a non-positive or NaN standard deviation.
#[inline]
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if sd.is_nan() || sd <= 0.0 {
        return f64::NAN;
    }
    standard_normal_pdf((x - mean) / sd) / sd
}

/// Evaluate N(x[j]; mean, sd) for every point of `x` into `out`.
///
/// `out` must be at least as long as `x`; extra slots are left untouched.
pub fn normal_pdf_into(x: &[f64], mean: f64, sd: f64, out: &mut [f64]) {
    for (dst, &xj) in out.iter_mut().zip(x) {
        *dst = normal_pdf(xj, mean, sd);
    }
}
