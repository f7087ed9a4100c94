//! Artifact set: the on-disk contract between training and serving.
//!
//! Layout of an artifact directory:
//! - `pipeline.json`: serialized [`Pipeline`] (format-versioned)
//! - `feature_names.json`: JSON array, training column order
//! - `MODEL_VERSION`: optional single-line version token
//! - `metrics.json`: [`MetricsReport`] (audit only, never read by serving)
//!
//! Loading is a single step: all files are read and cross-checked before an
//! [`ArtifactSet`] is handed out.

use core::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ArtifactError, ArtifactResult};
use crate::pipeline::{EstimatorKind, Pipeline};
use crate::schema::FeatureSchema;

pub const PIPELINE_FILE: &str = "pipeline.json";
pub const FEATURES_FILE: &str = "feature_names.json";
pub const VERSION_FILE: &str = "MODEL_VERSION";
pub const METRICS_FILE: &str = "metrics.json";

/// Version identifier attached to an artifact set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelVersion(String);

impl ModelVersion {
    /// Sentinel used when an artifact set carries no version file.
    pub const UNKNOWN: &'static str = "unknown";

    /// Build a version from free text. Surrounding whitespace is dropped and a
    /// blank value collapses to [`ModelVersion::UNKNOWN`].
    pub fn new(value: impl AsRef<str>) -> Self {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Self::unknown();
        }
        Self(trimmed.to_string())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelVersion {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Held-out evaluation of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub model: EstimatorKind,
    pub seed: u64,
    pub test_size: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub n_train: usize,
    pub n_test: usize,
}

impl MetricsReport {
    pub fn write(&self, dir: &Path) -> ArtifactResult<()> {
        write_json(&dir.join(METRICS_FILE), self)
    }

    pub fn read(dir: &Path) -> ArtifactResult<Self> {
        let path = dir.join(METRICS_FILE);
        let text = read_text(&path)?;
        serde_json::from_str(&text).map_err(|e| ArtifactError::malformed(&path, e.to_string()))
    }
}

/// Pipeline, schema, and version loaded together and validated as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub pipeline: Pipeline,
    pub schema: FeatureSchema,
    pub version: ModelVersion,
}

impl ArtifactSet {
    /// Assemble a set and check it is internally consistent.
    pub fn new(pipeline: Pipeline, schema: FeatureSchema, version: ModelVersion) -> ArtifactResult<Self> {
        let set = Self {
            pipeline,
            schema,
            version,
        };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> ArtifactResult<()> {
        self.pipeline.validate()?;
        let pipeline = self.pipeline.n_features_in();
        if self.schema.len() != pipeline {
            return Err(ArtifactError::FeatureCountMismatch {
                schema: self.schema.len(),
                pipeline,
            });
        }
        Ok(())
    }

    /// Read and validate the artifact set stored in `dir`.
    ///
    /// A missing `MODEL_VERSION` file yields [`ModelVersion::UNKNOWN`]; every
    /// other missing or malformed file is an error.
    pub fn load(dir: &Path) -> ArtifactResult<Self> {
        let schema = read_schema(&dir.join(FEATURES_FILE))?;
        let pipeline = read_pipeline(&dir.join(PIPELINE_FILE))?;
        let version = read_version(&dir.join(VERSION_FILE))?;

        let set = Self::new(pipeline, schema, version)?;
        tracing::debug!(
            dir = %dir.display(),
            n_features = set.schema.len(),
            model = %set.pipeline.estimator.kind,
            version = %set.version,
            "artifact set loaded"
        );
        Ok(set)
    }

    /// Write pipeline, schema, and version into `dir`, creating it if needed.
    ///
    /// An unknown version is written as the absence of `MODEL_VERSION`.
    pub fn write(&self, dir: &Path) -> ArtifactResult<()> {
        self.validate()?;
        fs::create_dir_all(dir).map_err(|e| ArtifactError::io(dir, e))?;

        write_json(&dir.join(PIPELINE_FILE), &self.pipeline)?;
        write_json(&dir.join(FEATURES_FILE), &self.schema)?;

        let path = dir.join(VERSION_FILE);
        if self.version.is_unknown() {
            // A version left over from an earlier run must not label this one.
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "removed stale version file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ArtifactError::io(&path, e)),
            }
        } else {
            fs::write(&path, self.version.as_str()).map_err(|e| ArtifactError::io(&path, e))?;
        }
        Ok(())
    }
}

fn read_text(path: &Path) -> ArtifactResult<String> {
    fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ArtifactResult<()> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| ArtifactError::malformed(path, e.to_string()))?;
    fs::write(path, body).map_err(|e| ArtifactError::io(path, e))
}

fn read_schema(path: &Path) -> ArtifactResult<FeatureSchema> {
    let text = read_text(path)?;
    let names: Vec<String> =
        serde_json::from_str(&text).map_err(|e| ArtifactError::malformed(path, e.to_string()))?;
    FeatureSchema::new(names)
}

fn read_pipeline(path: &Path) -> ArtifactResult<Pipeline> {
    let text = read_text(path)?;
    let raw: JsonValue =
        serde_json::from_str(&text).map_err(|e| ArtifactError::malformed(path, e.to_string()))?;

    // Format revision is checked before the body is decoded.
    let found = raw
        .get("format_version")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| ArtifactError::malformed(path, "missing format_version"))?;
    let found = u32::try_from(found).unwrap_or(u32::MAX);
    if found != crate::pipeline::PIPELINE_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedFormat {
            found,
            supported: crate::pipeline::PIPELINE_FORMAT_VERSION,
        });
    }

    serde_json::from_value(raw).map_err(|e| ArtifactError::malformed(path, e.to_string()))
}

fn read_version(path: &Path) -> ArtifactResult<ModelVersion> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(ModelVersion::new(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no version file; reporting '{}'", ModelVersion::UNKNOWN);
            Ok(ModelVersion::unknown())
        }
        Err(e) => Err(ArtifactError::io(path, e)),
    }
}
