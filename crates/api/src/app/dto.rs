use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::context::Issue;

// -------------------------
// Request DTOs
// -------------------------

/// One patient's feature vector, keyed by feature name.
///
/// Documentation only: `/predict` validates the raw JSON against the loaded
/// schema, and the published document lists the loaded feature names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Features(pub BTreeMap<String, f64>);

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub model_version: String,
}

impl HealthResponse {
    pub const OK: &'static str = "ok";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub prediction: f64,
}

/// Root response when interactive docs are disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub model_version: String,
    pub docs: String,
}

/// Body of every 4xx/5xx answer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable code (`invalid_payload`, `invalid_json`, `prediction_failed`).
    pub error: String,
    pub message: String,
    /// Every schema problem found in the payload; only for `invalid_payload`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}
