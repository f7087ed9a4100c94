//! Feature standardization fitted on the training partition.

use triage_core::StandardScaler;

/// Columns whose standard deviation falls below this keep a unit scale.
const MIN_SCALE: f64 = 1e-12;

/// Learn per-column mean and population standard deviation.
///
/// Zero-variance columns get a scale of `1.0` so transforming them yields 0
/// instead of dividing by zero. `rows` must be non-empty and rectangular.
pub fn fit_scaler(rows: &[Vec<f64>]) -> StandardScaler {
    let n = rows.len() as f64;
    let d = rows.first().map_or(0, Vec::len);

    let mut mean = vec![0.0; d];
    for row in rows {
        for (m, x) in mean.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut var = vec![0.0; d];
    for row in rows {
        for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
            *v += (x - m).powi(2);
        }
    }

    let scale = var
        .into_iter()
        .map(|v| {
            let sd = (v / n).sqrt();
            if sd < MIN_SCALE { 1.0 } else { sd }
        })
        .collect();

    StandardScaler { mean, scale }
}

/// Standardize every row with a fitted scaler.
pub fn transform(scaler: &StandardScaler, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter().map(|r| scaler.transform_row(r)).collect()
}
