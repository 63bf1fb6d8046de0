//! Grid representation of a density and trapezoid-rule integration.
//!
//! A density is never a closed-form object here: it is a vector of
//! pointwise values paired with a fixed, strictly increasing [`Grid`].
//! Integrals over the grid use the trapezoid rule.

use serde::{Deserialize, Serialize};

use super::error::{ensure_finite, ensure_same_len, MixtureError, MixtureResult};

/// Strictly increasing, finite, non-empty sequence of sample points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Grid {
    points: Vec<f64>,
}

impl Grid {
    /// Validate and wrap a sequence of grid points.
    pub fn new(points: Vec<f64>) -> MixtureResult<Self> {
        if points.is_empty() {
            return Err(MixtureError::Empty { what: "grid" });
        }
        ensure_finite("grid", &points)?;
        ensure_ascending(&points)?;
        Ok(Self { points })
    }

    /// `points` evenly spaced values from `lower` to `upper` inclusive.
    pub fn linspace(lower: f64, upper: f64, points: usize) -> MixtureResult<Self> {
        if points < 2 {
            return Err(MixtureError::TooFewPoints {
                needed: 2,
                actual: points,
            });
        }
        let step = (upper - lower) / (points - 1) as f64;
        let mut values: Vec<f64> = (0..points).map(|j| lower + step * j as f64).collect();
        // Pin the endpoint so it is exact regardless of rounding in `step`.
        values[points - 1] = upper;
        Self::new(values)
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed grid; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    pub fn lower(&self) -> f64 {
        self.points[0]
    }

    pub fn upper(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Trapezoid-rule integral of `values` sampled on this grid.
    ///
    /// `values` is expected to have one entry per grid point; surplus
    /// entries on either side are ignored.
    pub fn integrate(&self, values: &[f64]) -> f64 {
        debug_assert_eq!(values.len(), self.points.len());
        trapezoid_sum(&self.points, values)
    }

    /// Flat density that integrates to one over the grid range.
    pub fn uniform_density(&self) -> Vec<f64> {
        let width = self.upper() - self.lower();
        let height = if width > 0.0 { 1.0 / width } else { 1.0 };
        vec![height; self.points.len()]
    }
}

impl TryFrom<Vec<f64>> for Grid {
    type Error = MixtureError;

    fn try_from(points: Vec<f64>) -> Result<Self, Self::Error> {
        Grid::new(points)
    }
}

impl From<Grid> for Vec<f64> {
    fn from(grid: Grid) -> Self {
        grid.points
    }
}

/// Trapezoid-rule approximation of the integral of `y` over `x`.
///
/// `x` and `y` must have the same length and `x` must be strictly
/// increasing. Fewer than two points integrate to `0.0`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> MixtureResult<f64> {
    ensure_same_len("y", x.len(), y.len())?;
    if x.len() < 2 {
        return Ok(0.0);
    }
    ensure_finite("x", x)?;
    ensure_ascending(x)?;
    Ok(trapezoid_sum(x, y))
}

fn trapezoid_sum(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

fn ensure_ascending(points: &[f64]) -> MixtureResult<()> {
    match points.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(MixtureError::GridNotAscending { index: i + 1 }),
        None => Ok(()),
    }
}
