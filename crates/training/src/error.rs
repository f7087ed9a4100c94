use std::path::PathBuf;

use thiserror::Error;
use triage_core::ArtifactError;

pub type TrainResult<T> = Result<T, TrainError>;

/// Failure of a training run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Invalid run configuration (unknown selector, bad split fraction, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset could not be read or does not have the expected shape.
    #[error("dataset error ({}): {reason}", source_name(.path))]
    Dataset {
        path: Option<PathBuf>,
        reason: String,
    },

    /// The estimator could not be fitted (e.g. singular normal equations).
    #[error("fit failed: {0}")]
    Fit(String),

    /// Writing the artifact set failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl TrainError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn dataset(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Dataset {
            path,
            reason: reason.into(),
        }
    }

    pub fn fit(msg: impl Into<String>) -> Self {
        Self::Fit(msg.into())
    }
}

fn source_name(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "reference".to_string(),
    }
}
