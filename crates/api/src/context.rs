use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use utoipa::ToSchema;

use triage_core::{ArtifactSet, FeatureSchema, ModelVersion, Pipeline};

/// Loaded model state shared by every request.
///
/// Built once at startup from a validated [`ArtifactSet`] and never mutated,
/// so handlers can share it through an `Arc` without locking.
#[derive(Debug)]
pub struct ModelContext {
    pipeline: Pipeline,
    schema: FeatureSchema,
    version: ModelVersion,
}

impl ModelContext {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            pipeline: artifacts.pipeline,
            schema: artifacts.schema,
            version: artifacts.version,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn version(&self) -> &ModelVersion {
        &self.version
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Validate a JSON payload against the schema and score it.
    ///
    /// The payload key set must equal the schema exactly. Values are
    /// reordered into training order before they reach the pipeline.
    pub fn predict(&self, payload: &JsonValue) -> Result<f64, PredictError> {
        let obj = payload.as_object().ok_or_else(|| {
            PredictError::InvalidPayload(vec![Issue::new(
                "body",
                IssueKind::NotAnObject,
                "request body must be a JSON object of feature values",
            )])
        })?;

        let row = self.features_in_order(obj)?;
        let prediction = self.pipeline.predict_row(&row);
        if !prediction.is_finite() {
            return Err(PredictError::NonFinite);
        }
        Ok(prediction)
    }

    fn features_in_order(&self, obj: &Map<String, JsonValue>) -> Result<Vec<f64>, PredictError> {
        let mut issues = Vec::new();
        let mut row = Vec::with_capacity(self.schema.len());

        for name in self.schema.iter() {
            match obj.get(name) {
                None => issues.push(Issue::new(name, IssueKind::Missing, "field required")),
                Some(value) => match value.as_f64() {
                    Some(x) => row.push(x),
                    None => issues.push(Issue::new(
                        name,
                        IssueKind::NotANumber,
                        "input should be a valid number",
                    )),
                },
            }
        }

        for key in obj.keys().filter(|k| !self.schema.contains(k)) {
            issues.push(Issue::new(key, IssueKind::Unexpected, "extra inputs are not permitted"));
        }

        if issues.is_empty() {
            Ok(row)
        } else {
            Err(PredictError::InvalidPayload(issues))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NotAnObject,
    Missing,
    Unexpected,
    NotANumber,
}

/// One problem found in a prediction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Issue {
    pub loc: String,
    pub kind: IssueKind,
    pub msg: String,
}

impl Issue {
    fn new(loc: impl Into<String>, kind: IssueKind, msg: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            kind,
            msg: msg.into(),
        }
    }
}

/// Per-request prediction failure; never affects service state.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    /// Client sent a payload that does not match the feature schema.
    #[error("invalid payload ({} issue(s))", .0.len())]
    InvalidPayload(Vec<Issue>),

    /// The pipeline produced NaN or infinity for this input.
    #[error("prediction is not a finite number")]
    NonFinite,
}
