//! Linear estimators fitted on standardized features.
//!
//! Both kinds solve the normal equations on centered data:
//!
//! `(ZcᵀZc + αI) w = Zcᵀyc`, `intercept = ȳ - z̄ᵀw`
//!
//! with `α = 0` for [`EstimatorKind::Plain`]. The intercept is never penalized.

use ndarray::{Array1, Array2, Axis};
use triage_core::{EstimatorKind, LinearModel};

use crate::error::{TrainError, TrainResult};

/// Relative pivot threshold below which the system is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Fitting capability shared by every estimator kind.
pub trait Fit {
    /// Fit on standardized rows `z` and targets `y` (same length, non-empty).
    fn fit(&self, z: &[Vec<f64>], y: &[f64]) -> TrainResult<LinearModel>;
}

impl Fit for EstimatorKind {
    fn fit(&self, z: &[Vec<f64>], y: &[f64]) -> TrainResult<LinearModel> {
        if z.is_empty() || z.len() != y.len() {
            return Err(TrainError::fit(format!(
                "need matching non-empty inputs, got {} rows and {} targets",
                z.len(),
                y.len()
            )));
        }
        let d = z[0].len();
        if z.iter().any(|row| row.len() != d) {
            return Err(TrainError::fit("feature rows have differing lengths"));
        }

        let z = Array2::from_shape_vec((y.len(), d), z.iter().flatten().copied().collect())
            .map_err(|e| TrainError::fit(e.to_string()))?;
        let y = Array1::from(y.to_vec());

        let z_mean = z
            .mean_axis(Axis(0))
            .ok_or_else(|| TrainError::fit("no rows to average"))?;
        let y_mean = y.mean().ok_or_else(|| TrainError::fit("no targets to average"))?;

        let zc = &z - &z_mean;
        let yc = &y - y_mean;

        let mut a = zc.t().dot(&zc);
        let alpha = self.l2_penalty();
        a.diag_mut().mapv_inplace(|v| v + alpha);
        let b = zc.t().dot(&yc);

        let coef = solve(a, b)
            .ok_or_else(|| TrainError::fit(format!("{self} estimator: normal equations are singular")))?;
        let intercept = y_mean - z_mean.dot(&coef);

        Ok(LinearModel {
            kind: *self,
            intercept,
            coef: coef.to_vec(),
        })
    }
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot is negligible relative to the largest diagonal.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let d = b.len();
    let magnitude = a.diag().iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);

    for col in 0..d {
        let pivot = (col..d).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() <= SINGULAR_TOLERANCE * magnitude {
            return None;
        }
        if pivot != col {
            for k in 0..d {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..d {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..d {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(d);
    for row in (0..d).rev() {
        let tail: f64 = ((row + 1)..d).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}
