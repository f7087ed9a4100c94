//! Fitted model pipeline: feature standardizer composed with a linear estimator.
//!
//! These types only *apply* a fitted model. Fitting lives in `triage-training`;
//! the serving side never needs it.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ArtifactError, ArtifactResult};

/// Revision of the serialized pipeline layout.
///
/// Bump when the persisted shape changes; loaders refuse anything else.
pub const PIPELINE_FORMAT_VERSION: u32 = 1;

/// Fixed L2 strength used by [`EstimatorKind::Regularized`].
pub const RIDGE_ALPHA: f64 = 1.0;

/// Per-feature standardization learned from training data: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row. Caller guarantees `row.len() == n_features()`.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// Closed set of estimator kinds a pipeline can carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Ordinary least squares.
    Plain,
    /// Ridge regression with [`RIDGE_ALPHA`].
    Regularized,
}

impl EstimatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorKind::Plain => "plain",
            EstimatorKind::Regularized => "regularized",
        }
    }

    /// L2 penalty applied to the coefficients (never the intercept).
    pub fn l2_penalty(&self) -> f64 {
        match self {
            EstimatorKind::Plain => 0.0,
            EstimatorKind::Regularized => RIDGE_ALPHA,
        }
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown model selector '{0}' (expected one of: plain, linear, regularized, ridge)")]
pub struct UnknownEstimatorKind(pub String);

impl FromStr for EstimatorKind {
    type Err = UnknownEstimatorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "linear" => Ok(EstimatorKind::Plain),
            "regularized" | "ridge" => Ok(EstimatorKind::Regularized),
            _ => Err(UnknownEstimatorKind(s.to_string())),
        }
    }
}

/// Fitted linear estimator over standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub kind: EstimatorKind,
    pub intercept: f64,
    pub coef: Vec<f64>,
}

impl LinearModel {
    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + row.iter().zip(&self.coef).map(|(x, w)| x * w).sum::<f64>()
    }
}

/// Serialized pipeline blob: standardizer then estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub format_version: u32,
    pub scaler: StandardScaler,
    pub estimator: LinearModel,
}

impl Pipeline {
    pub fn new(scaler: StandardScaler, estimator: LinearModel) -> Self {
        Self {
            format_version: PIPELINE_FORMAT_VERSION,
            scaler,
            estimator,
        }
    }

    /// Number of input features the pipeline was fitted on.
    pub fn n_features_in(&self) -> usize {
        self.scaler.n_features()
    }

    /// Check internal consistency of the fitted parameters.
    pub fn validate(&self) -> ArtifactResult<()> {
        if self.format_version != PIPELINE_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedFormat {
                found: self.format_version,
                supported: PIPELINE_FORMAT_VERSION,
            });
        }

        let n = self.scaler.mean.len();
        if n == 0 {
            return Err(ArtifactError::invalid_pipeline("pipeline has no features"));
        }
        if self.scaler.scale.len() != n {
            return Err(ArtifactError::invalid_pipeline(format!(
                "scaler has {} means but {} scales",
                n,
                self.scaler.scale.len()
            )));
        }
        if self.estimator.coef.len() != n {
            return Err(ArtifactError::invalid_pipeline(format!(
                "estimator has {} coefficients but scaler has {} features",
                self.estimator.coef.len(),
                n
            )));
        }
        if self.scaler.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ArtifactError::invalid_pipeline("scaler scales must be finite and positive"));
        }

        let all_finite = self.scaler.mean.iter().all(|v| v.is_finite())
            && self.estimator.coef.iter().all(|v| v.is_finite())
            && self.estimator.intercept.is_finite();
        if !all_finite {
            return Err(ArtifactError::invalid_pipeline("pipeline parameters must be finite"));
        }

        Ok(())
    }

    /// Apply standardizer then estimator to one row in schema order.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let z = self.scaler.transform_row(row);
        self.estimator.predict_row(&z)
    }
}
