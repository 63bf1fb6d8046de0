//! Fitted two-groups model produced by a completed recursion sweep.

use normix_math::{normal_pdf, Grid};
use serde::Serialize;

use super::engine::{mixture_terms, RecursionError};

/// Estimates after one sweep, plus the fitted densities on the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveRecursionFit {
    pub grid_x: Grid,
    /// Alternative sub-density of theta, one value per grid point.
    pub theta_subdens: Vec<f64>,
    pub pi0: f64,
    /// Fitted marginal density of the statistic at each grid point.
    pub y_mix: Vec<f64>,
    /// Alternative-only density, renormalized by `1 - pi0`.
    pub y_signal: Vec<f64>,
    pub mu0: f64,
    pub sig0: f64,
    /// Number of observations consumed.
    pub observations: usize,
}

impl PredictiveRecursionFit {
    /// Local false discovery rate `pi0 f0(x) / f(x)` at each grid point.
    ///
    /// Points where the fitted marginal is zero report 1.
    pub fn local_fdr_on_grid(&self) -> Vec<f64> {
        self.grid_x
            .as_slice()
            .iter()
            .zip(&self.y_mix)
            .map(|(&x, &f)| {
                let null = self.pi0 * normal_pdf(x, self.mu0, self.sig0);
                lfdr_ratio(null, f)
            })
            .collect()
    }

    /// Fitted marginal density at an arbitrary statistic.
    pub fn marginal_density_at(&self, z: f64) -> f64 {
        let mut joint = vec![0.0; self.grid_x.len()];
        let (m0, m1) = mixture_terms(
            &self.grid_x,
            &self.theta_subdens,
            self.pi0,
            z,
            self.mu0,
            self.sig0,
            &mut joint,
        );
        m0 + m1
    }

    /// Local false discovery rate for each observed statistic.
    pub fn local_fdr(&self, z: &[f64]) -> Result<Vec<f64>, RecursionError> {
        let mut joint = vec![0.0; self.grid_x.len()];
        z.iter()
            .enumerate()
            .map(|(index, &zi)| {
                let (m0, m1) = mixture_terms(
                    &self.grid_x,
                    &self.theta_subdens,
                    self.pi0,
                    zi,
                    self.mu0,
                    self.sig0,
                    &mut joint,
                );
                let f = m0 + m1;
                if !f.is_finite() || f <= 0.0 {
                    return Err(RecursionError::NumericDegeneracy {
                        index,
                        observation: zi,
                    });
                }
                Ok((m0 / f).min(1.0))
            })
            .collect()
    }

    /// Grid points whose local FDR is at or below `threshold`.
    pub fn discoveries_on_grid(&self, threshold: f64) -> Vec<f64> {
        self.grid_x
            .as_slice()
            .iter()
            .zip(self.local_fdr_on_grid())
            .filter(|(_, lfdr)| *lfdr <= threshold)
            .map(|(&x, _)| x)
            .collect()
    }
}

fn lfdr_ratio(null: f64, marginal: f64) -> f64 {
    if marginal > 0.0 {
        (null / marginal).min(1.0)
    } else {
        1.0
    }
}
