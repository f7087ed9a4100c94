use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::Value as JsonValue;

use crate::app::dto::{ErrorResponse, Features, PredictionResponse};
use crate::app::errors;
use crate::context::ModelContext;

/// Predict diabetes progression for one patient.
///
/// Body parsing is done by hand so malformed JSON gets the same error shape
/// as a schema mismatch.
#[utoipa::path(
    post,
    path = "/predict",
    tag = "inference",
    request_body = Features,
    responses(
        (status = 200, description = "Continuous progression score (higher = worse)", body = PredictionResponse),
        (status = 400, description = "Body is not JSON, or does not match the feature schema", body = ErrorResponse),
        (status = 500, description = "Prediction failed for this input", body = ErrorResponse)
    )
)]
pub async fn predict(
    Extension(ctx): Extension<Arc<ModelContext>>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> axum::response::Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            tracing::info!(reason = %rejection.body_text(), "unparseable prediction body");
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text());
        }
    };

    match ctx.predict(&payload) {
        Ok(prediction) => Json(PredictionResponse { prediction }).into_response(),
        Err(e) => errors::predict_error_to_response(e),
    }
}
