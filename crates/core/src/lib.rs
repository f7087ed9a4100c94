//! `triage-core` - the artifact contract shared by training and serving.
//!
//! This crate contains the persisted model types and the artifact-set loader.
//! It knows how to *apply* a fitted pipeline, not how to fit one.

pub mod artifact;
pub mod error;
pub mod pipeline;
pub mod schema;

pub use artifact::{ArtifactSet, MetricsReport, ModelVersion};
pub use error::{ArtifactError, ArtifactResult};
pub use pipeline::{EstimatorKind, LinearModel, Pipeline, StandardScaler, UnknownEstimatorKind};
pub use schema::{FeatureSchema, REFERENCE_FEATURES};
