//! HTTP API application wiring (Axum router + shared context).
//!
//! - `routes/`: HTTP handlers (`system` for health/root/docs, `inference` for predict)
//! - `dto.rs`: response DTOs
//! - `errors.rs`: consistent error responses
//! - `openapi.rs`: OpenAPI document for the loaded model

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::DocsConfig;
use crate::context::ModelContext;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod openapi;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Takes a context that finished loading; there is no router for a service
/// that is still starting or failed to start.
pub fn build_app(ctx: Arc<ModelContext>, docs: DocsConfig) -> Router {
    let api_doc = openapi::document(&ctx);
    routes::router(&docs, &api_doc)
        .layer(Extension(ctx))
        .layer(Extension(Arc::new(docs)))
        .layer(Extension(Arc::new(api_doc)))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_log)))
}
