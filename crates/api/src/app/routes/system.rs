use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Redirect},
    Json,
};
use utoipa::openapi::OpenApi;

use crate::app::dto::{HealthResponse, RootResponse};
use crate::config::DocsConfig;
use crate::context::ModelContext;

/// Service status and model version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "ops",
    responses((status = 200, description = "Service is up with a loaded model", body = HealthResponse))
)]
pub async fn health(Extension(ctx): Extension<Arc<ModelContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthResponse::OK.to_string(),
        model_version: ctx.version().to_string(),
    })
}

/// Redirect to the docs page, or report status when docs are disabled.
pub async fn root(
    Extension(ctx): Extension<Arc<ModelContext>>,
    Extension(docs): Extension<Arc<DocsConfig>>,
) -> axum::response::Response {
    match &docs.docs_url {
        Some(url) => Redirect::temporary(url).into_response(),
        None => Json(RootResponse {
            status: HealthResponse::OK.to_string(),
            model_version: ctx.version().to_string(),
            docs: "disabled".to_string(),
        })
        .into_response(),
    }
}

/// The OpenAPI document built for the loaded model.
pub async fn openapi(Extension(doc): Extension<Arc<OpenApi>>) -> Json<OpenApi> {
    Json(OpenApi::clone(&doc))
}
