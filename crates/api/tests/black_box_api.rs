use std::path::Path;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use triage_api::{DocsConfig, ModelContext, Startup};
use triage_core::artifact::{FEATURES_FILE, PIPELINE_FILE, VERSION_FILE};
use triage_core::{ArtifactSet, EstimatorKind};
use triage_training::{train, TrainConfig};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(ctx: Arc<ModelContext>, docs: DocsConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = triage_api::app::build_app(ctx, docs);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bake(dir: &Path, model: EstimatorKind, version: Option<&str>) {
    let mut cfg = TrainConfig::new(dir).with_seed(42).with_model(model);
    if let Some(v) = version {
        cfg = cfg.with_version(v);
    }
    train(&cfg).expect("training failed");
}

fn boot(dir: &Path) -> Arc<ModelContext> {
    let mut startup = Startup::new(dir);
    startup.run();
    startup.into_ready().expect("startup failed")
}

fn validation_row() -> Value {
    json!({
        "age": 0.03, "sex": -0.04, "bmi": 0.02, "bp": 0.01,
        "s1": -0.02, "s2": 0.01, "s3": 0.0, "s4": -0.01, "s5": 0.02, "s6": -0.001
    })
}

async fn post_predict(client: &reqwest::Client, base_url: &str, body: &Value) -> reqwest::Response {
    client
        .post(format!("{}/predict", base_url))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_and_baked_version() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "model_version": "v0.1" }));
}

#[tokio::test]
async fn health_reports_unknown_without_version_file() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, None);
    assert!(!dir.path().join(VERSION_FILE).exists());
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;

    let body: Value = reqwest::get(format!("{}/health", srv.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["model_version"], "unknown");
}

#[tokio::test]
async fn prediction_matches_persisted_parameters() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let client = reqwest::Client::new();

    let res = post_predict(&client, &srv.base_url, &validation_row()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let served = body["prediction"].as_f64().expect("prediction is a number");

    // Apply the persisted scaler + estimator by hand, reading the raw files.
    let pipeline: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(PIPELINE_FILE)).unwrap()).unwrap();
    let names: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(FEATURES_FILE)).unwrap()).unwrap();
    let row = validation_row();
    let mut expected = pipeline["estimator"]["intercept"].as_f64().unwrap();
    for (i, name) in names.iter().enumerate() {
        let x = row[name].as_f64().unwrap();
        let mean = pipeline["scaler"]["mean"][i].as_f64().unwrap();
        let scale = pipeline["scaler"]["scale"][i].as_f64().unwrap();
        let w = pipeline["estimator"]["coef"][i].as_f64().unwrap();
        expected += w * (x - mean) / scale;
    }

    assert!((served - expected).abs() < 1e-9, "served {served}, expected {expected}");
}

#[tokio::test]
async fn predict_is_pure_across_calls_and_restarts() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let client = reqwest::Client::new();

    let first = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let a: Value = post_predict(&client, &first.base_url, &validation_row()).await.json().await.unwrap();
    let b: Value = post_predict(&client, &first.base_url, &validation_row()).await.json().await.unwrap();
    drop(first);

    let second = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let c: Value = post_predict(&client, &second.base_url, &validation_row()).await.json().await.unwrap();

    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[tokio::test]
async fn missing_feature_is_a_client_error_and_service_stays_up() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let client = reqwest::Client::new();

    let mut body = validation_row();
    body.as_object_mut().unwrap().remove("bmi");
    let res = post_predict(&client, &srv.base_url, &body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_payload");
    assert_eq!(err["issues"][0]["loc"], "bmi");
    assert_eq!(err["issues"][0]["kind"], "missing");

    // Subsequent valid request is unaffected.
    let res = post_predict(&client, &srv.base_url, &validation_row()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn extra_feature_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let client = reqwest::Client::new();

    let mut body = validation_row();
    body["extra_feature"] = json!(1.0);
    let res = post_predict(&client, &srv.base_url, &body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["issues"][0]["loc"], "extra_feature");
    assert_eq!(err["issues"][0]["kind"], "unexpected");
}

#[tokio::test]
async fn non_numeric_and_malformed_bodies_are_client_errors() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let client = reqwest::Client::new();

    let res = post_predict(&client, &srv.base_url, &json!({ "age": "oops" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["issues"].as_array().unwrap().len(), 10);

    let res = client
        .post(format!("{}/predict", srv.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_json");
    assert!(err.get("issues").is_none());
}

#[tokio::test]
async fn overflowing_input_is_a_server_error_for_that_request_only() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;
    let client = reqwest::Client::new();

    let mut body = validation_row();
    for (_, v) in body.as_object_mut().unwrap().iter_mut() {
        *v = json!(1e308);
    }
    let res = post_predict(&client, &srv.base_url, &body).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn regularized_model_keeps_the_contract_shape() {
    let plain_dir = tempfile::tempdir().unwrap();
    let ridge_dir = tempfile::tempdir().unwrap();
    bake(plain_dir.path(), EstimatorKind::Plain, Some("v1"));
    bake(ridge_dir.path(), EstimatorKind::Regularized, Some("v1"));

    let plain = ArtifactSet::load(plain_dir.path()).unwrap();
    let ridge = ArtifactSet::load(ridge_dir.path()).unwrap();
    assert_eq!(plain.schema, ridge.schema);

    let srv = TestServer::spawn(boot(ridge_dir.path()), DocsConfig::default()).await;
    let client = reqwest::Client::new();
    let body: Value = post_predict(&client, &srv.base_url, &validation_row()).await.json().await.unwrap();
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["prediction"]);
}

#[tokio::test]
async fn root_redirects_to_docs_and_docs_describe_the_schema() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let srv = TestServer::spawn(boot(dir.path()), DocsConfig::default()).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let res = client.get(format!("{}/", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()["location"], "/docs");

    // Swagger UI, reached through its trailing-slash redirect.
    let res = reqwest::get(format!("{}/docs", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().to_lowercase().contains("swagger"));

    // ReDoc embeds the document itself.
    let res = reqwest::get(format!("{}/redoc", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("/predict"));

    let doc: Value = client
        .get(format!("{}/openapi.json", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let required = doc["components"]["schemas"]["Features"]["required"].as_array().unwrap();
    assert_eq!(required.len(), 10);
    assert_eq!(required[2], "bmi");
    assert_eq!(doc["info"]["version"], "v0.1");
}

#[tokio::test]
async fn root_reports_status_when_docs_are_disabled() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let docs = DocsConfig {
        docs_url: None,
        redoc_url: None,
        ..DocsConfig::default()
    };
    let srv = TestServer::spawn(boot(dir.path()), docs).await;

    let res = reqwest::get(format!("{}/", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "model_version": "v0.1", "docs": "disabled" }));

    for page in ["docs", "redoc"] {
        let res = reqwest::get(format!("{}/{page}", srv.base_url)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{page}");
    }

    // The machine-readable document stays available.
    let res = reqwest::get(format!("{}/openapi.json", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await.unwrap();
    assert_eq!(doc["info"]["version"], "v0.1");
}

#[tokio::test]
async fn docs_follow_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    let docs = DocsConfig {
        docs_url: Some("/swagger".to_string()),
        redoc_url: Some("/reference".to_string()),
        openapi_url: "/api/schema.json".to_string(),
    };
    let srv = TestServer::spawn(boot(dir.path()), docs).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let res = client.get(format!("{}/", srv.base_url)).send().await.unwrap();
    assert_eq!(res.headers()["location"], "/swagger");

    for path in ["/swagger/", "/reference", "/api/schema.json"] {
        let res = client.get(format!("{}{path}", srv.base_url)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
    let res = client.get(format!("{}/openapi.json", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inconsistent_artifacts_never_reach_ready() {
    let dir = tempfile::tempdir().unwrap();
    bake(dir.path(), EstimatorKind::Plain, Some("v0.1"));
    std::fs::write(dir.path().join(FEATURES_FILE), r#"["age","sex","bmi"]"#).unwrap();

    let mut startup = Startup::new(dir.path());
    assert_eq!(startup.run().label(), "failed");
    assert!(startup.into_ready().is_err());
}
