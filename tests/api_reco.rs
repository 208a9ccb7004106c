use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

use recoserve::api::{build_router, AppState};
use recoserve::config::ApiConfig;
use recoserve::recommendation::store;

const TOKEN: &str = "test-token";
const K_RECS: usize = 4;
const MAX_USER_ID: u64 = 1_000_000_000;

fn build_artifacts(dir: &Path) {
    fs::write(dir.join("items.csv"), "item_id\n10\n11\n12\n13\n14\n15\n").unwrap();
    fs::write(dir.join("popular.json"), "[15, 14, 13, 12, 11]").unwrap();
    fs::create_dir_all(dir.join("models")).unwrap();
    fs::write(
        dir.join("models").join("als.json"),
        r#"{"123": [10, 11, 12, 13]}"#,
    )
    .unwrap();
}

fn app(dir: &Path) -> Router {
    let registry = store::load_registry(dir).unwrap();
    let state = Arc::new(AppState {
        registry,
        token: TOKEN.to_string(),
        k_recs: K_RECS,
        max_user_id: MAX_USER_ID,
    });
    let api = ApiConfig {
        port: 0,
        host: "127.0.0.1".to_string(),
        request_timeout: Duration::from_secs(5),
        cors_enabled: false,
        cors_origins: vec![],
    };
    build_router(state, &api)
}

async fn call(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::get(uri);
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
    (status, json)
}

fn bearer() -> Option<&'static str> {
    Some("Bearer test-token")
}

#[tokio::test]
async fn health_needs_no_auth() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(app(dir.path()), "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("I am alive".to_string()));
}

#[tokio::test]
async fn random_model_returns_k_items() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(app(dir.path()), "/reco/random/123", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], 123);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), K_RECS);
    for item in items {
        let id = item.as_i64().unwrap();
        assert!((10..=15).contains(&id));
    }
}

#[tokio::test]
async fn personalized_model_returns_user_entry() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(app(dir.path()), "/reco/als/123", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], serde_json::json!([10, 11, 12, 13]));
}

#[tokio::test]
async fn cold_user_gets_popularity_fallback() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(app(dir.path()), "/reco/als/999", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], serde_json::json!([15, 14, 13, 12]));
}

#[tokio::test]
async fn unknown_model_is_not_found() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(app(dir.path()), "/reco/unknown_model/123", bearer()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn user_above_ceiling_is_not_found() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(app(dir.path()), "/reco/random/10000000000", bearer()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, body) = call(
        app(dir.path()),
        "/reco/random/123",
        Some("Bearer wrong-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let dir = tempdir().unwrap();
    build_artifacts(dir.path());

    let (status, _body) = call(app(dir.path()), "/reco/random/123", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
