//! Artifact error model.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the artifact layer.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Integrity failure of an artifact set.
///
/// Every variant is fatal to service startup: a process that hits one of these
/// while loading must not serve predictions.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A required artifact file does not exist.
    #[error("artifact missing: {}", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read or written.
    #[error("artifact i/o failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content could not be decoded.
    #[error("artifact malformed ({}): {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// The pipeline blob was written by an incompatible format revision.
    #[error("unsupported pipeline format version {found} (supported: {supported})")]
    UnsupportedFormat { found: u32, supported: u32 },

    /// The feature schema itself is invalid (empty, duplicates, blank names).
    #[error("invalid feature schema: {0}")]
    Schema(String),

    /// The pipeline expects a different number of features than the schema lists.
    #[error("feature count mismatch: schema has {schema}, pipeline expects {pipeline}")]
    FeatureCountMismatch { schema: usize, pipeline: usize },

    /// Pipeline parameters are internally inconsistent (e.g. non-finite values).
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),
}

impl ArtifactError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn invalid_pipeline(msg: impl Into<String>) -> Self {
        Self::InvalidPipeline(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::Missing(path);
        }
        Self::Io { path, source }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
