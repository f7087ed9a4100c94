use axum::{
    routing::{get, post},
    Router,
};
use utoipa::openapi::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::{Config, SwaggerUi};

use crate::config::DocsConfig;

pub mod inference;
pub mod system;

/// Router for the inference contract plus docs endpoints.
///
/// The OpenAPI document is always served; the Swagger UI and ReDoc pages only
/// when their paths are configured.
pub fn router(docs: &DocsConfig, api_doc: &OpenApi) -> Router {
    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/predict", post(inference::predict))
        .route(&docs.openapi_url, get(system::openapi));

    if let Some(url) = &docs.docs_url {
        let swagger = SwaggerUi::new(url.clone()).config(Config::from(docs.openapi_url.clone()));
        router = router.merge(swagger);
    }
    if let Some(url) = &docs.redoc_url {
        router = router.merge(Redoc::with_url(url.clone(), api_doc.clone()));
    }
    router
}
