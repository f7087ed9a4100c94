use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::app::dto::ErrorResponse;
use crate::context::{Issue, PredictError};

pub fn predict_error_to_response(err: PredictError) -> axum::response::Response {
    match err {
        PredictError::InvalidPayload(issues) => {
            tracing::info!(issues = issues.len(), "rejected prediction payload");
            error_response(
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                "payload does not match the model's feature schema",
                issues,
            )
        }
        PredictError::NonFinite => {
            tracing::warn!("prediction produced a non-finite value");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "prediction_failed",
                "prediction is not a finite number",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    error_response(status, code, message, Vec::new())
}

fn error_response(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    issues: Vec<Issue>,
) -> axum::response::Response {
    (
        status,
        axum::Json(ErrorResponse {
            error: code.to_string(),
            message: message.into(),
            issues,
        }),
    )
        .into_response()
}
