//! Integration tests for operational endpoints and configuration handling.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use gaswatch::config::Config;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("gaswatch-system-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = "system-secret-system-secret-system".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = gaswatch::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    gaswatch::api::router(state)
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body_json["success"], 1);
    assert_eq!(body_json["data"]["status"], "ok");
    assert_eq!(body_json["data"]["database"], true);
}

#[tokio::test]
async fn test_metrics_requires_auth() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    post_json(
        &app,
        "/auth/register/",
        json!({
            "username": "ops",
            "email": "ops@example.com",
            "password": "ops-password",
            "device_unique_code": "OPS-1",
        }),
    )
    .await;
    let login = post_json(
        &app,
        "/auth/login/",
        json!({"email": "ops@example.com", "password": "ops-password"}),
    )
    .await;
    let token = login["access"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        String::from_utf8_lossy(&body),
        "Metrics not enabled or failed to initialize"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/does-not-exist/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_config_round_trip_and_validation() {
    let path = std::env::temp_dir().join(format!("gaswatch-config-{}.toml", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.server.port = 9191;
    config.telemetry.freshness_window_seconds = 120;
    config.save_to_path(&path).unwrap();

    let loaded = Config::load_from_path(&path).unwrap();
    assert_eq!(loaded.server.port, 9191);
    assert_eq!(loaded.telemetry.freshness_window_seconds, 120);
    assert!(loaded.validate().is_ok());

    let mut bad = loaded.clone();
    bad.security.jwt_secret = "too-short".to_string();
    assert!(bad.validate().is_err());

    let mut bad = loaded;
    bad.security.refresh_token_ttl_hours = 0;
    assert!(bad.validate().is_err());

    std::fs::remove_file(&path).ok();
}
