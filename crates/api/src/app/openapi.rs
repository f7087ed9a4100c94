//! OpenAPI document for the inference contract.
//!
//! Paths and DTOs are derived; the `Features` object is filled in at startup
//! from the loaded schema, so the document always matches the served model.

use utoipa::OpenApi;
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::{OpenApi as OpenApiDoc, RefOr};

use crate::app::dto::{ErrorResponse, Features, HealthResponse, PredictionResponse};
use crate::app::routes;
use crate::context::{Issue, IssueKind, ModelContext};

const FEATURES_SCHEMA: &str = "Features";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Virtual Diabetes Triage Scorer",
        description = "Predicts short-term diabetes progression index (higher = worse). \
                       Use the continuous score to prioritize nurse follow-ups.",
        license(name = "MIT")
    ),
    paths(routes::system::health, routes::inference::predict),
    components(schemas(Features, HealthResponse, PredictionResponse, ErrorResponse, Issue, IssueKind)),
    tags(
        (name = "ops", description = "Service status"),
        (name = "inference", description = "Progression scoring")
    )
)]
struct ApiDoc;

/// Document for a loaded model: `info.version` is the model version and
/// `Features` requires exactly the schema's names.
pub fn document(ctx: &ModelContext) -> OpenApiDoc {
    let mut doc = ApiDoc::openapi();
    doc.info.version = ctx.version().to_string();

    let mut features = ObjectBuilder::new().description(Some(
        "Baseline features keyed by name. Every listed feature is required; no others are accepted.",
    ));
    for name in ctx.schema().iter() {
        features = features
            .property(name, ObjectBuilder::new().schema_type(Type::Number))
            .required(name);
    }

    doc.components
        .get_or_insert_with(Default::default)
        .schemas
        .insert(FEATURES_SCHEMA.to_string(), RefOr::T(Schema::Object(features.build())));
    doc
}
