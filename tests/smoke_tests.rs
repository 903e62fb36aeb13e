//! Smoke tests for the monitoring flows used by the mobile client.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use base64::Engine;
use chrono::{Duration, Utc};
use gaswatch::api::AppState;
use gaswatch::config::Config;
use gaswatch::db::ReadingValues;
use gaswatch::services::FixedTelemetry;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    state: Arc<AppState>,
    router: Router,
    media_path: PathBuf,
}

async fn spawn_app(telemetry: FixedTelemetry) -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("gaswatch-smoke-test-{}.db", uuid::Uuid::new_v4()));
    let media_path =
        std::env::temp_dir().join(format!("gaswatch-smoke-media-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.general.media_path = media_path.display().to_string();
    config.security.jwt_secret = "smoke-secret-smoke-secret-smoke-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = gaswatch::api::create_app_state_with_telemetry(config, Arc::new(telemetry))
        .await
        .expect("failed to create app state");

    TestApp {
        router: gaswatch::api::router(state.clone()),
        state,
        media_path,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_public(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .router
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
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Registers and logs in `username`, returning `(user_id, access_token)`.
    async fn user(&self, username: &str) -> (i32, String) {
        let email = format!("{username}@example.com");

        let (status, _) = self
            .post_public(
                "/auth/register/",
                json!({
                    "username": username,
                    "email": email,
                    "password": "smoke-password",
                    "device_unique_code": format!("DEV-{username}"),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post_public(
                "/auth/login/",
                json!({"email": email, "password": "smoke-password"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (user, _) = self
            .state
            .store()
            .user_repo()
            .get_by_email_with_password(&email)
            .await
            .unwrap()
            .unwrap();
        (user.id, body["access"].as_str().unwrap().to_string())
    }

    async fn sensor(&self, token: &str, sensor_id: &str, sensor_type: &str) -> i32 {
        let (status, body) = self
            .send(
                "POST",
                "/sensors/",
                token,
                Some(json!({
                    "sensor_id": sensor_id,
                    "sensor_name": format!("{sensor_id} sensor"),
                    "location": format!("{sensor_id} room"),
                    "sensor_type": sensor_type,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap()
    }
}

fn reading(gas_level: f64, leak_detected: bool) -> ReadingValues {
    ReadingValues {
        gas_level: Some(gas_level),
        pressure: Some(15.0),
        temperature: Some(22.0),
        flow_rate: Some(2.5),
        leak_detected,
    }
}

#[tokio::test]
async fn test_dashboard_sensor_freshness() {
    let app = spawn_app(FixedTelemetry::default()).await;
    let (_, token) = app.user("olive").await;

    let fresh = app.sensor(&token, "FRESH-1", "GAS_LEVEL").await;
    let stale = app.sensor(&token, "STALE-1", "GAS_LEVEL").await;
    let edge = app.sensor(&token, "EDGE-1", "PRESSURE").await;
    app.sensor(&token, "SILENT-1", "TEMPERATURE").await;

    let sensors = app.state.store().sensor_repo();
    let now = Utc::now();
    sensors
        .record_reading(fresh, reading(12.5, false), now - Duration::seconds(10))
        .await
        .unwrap();
    sensors
        .record_reading(stale, reading(40.0, false), now - Duration::seconds(600))
        .await
        .unwrap();
    sensors
        .record_reading(edge, reading(5.0, false), now - Duration::seconds(300))
        .await
        .unwrap();

    let (status, body) = app.send("GET", "/dashboard/", &token, None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["total_sensors"], 4);
    assert_eq!(data["active_alerts"], 0);
    assert_eq!(data["user_name"], "olive");
    assert_eq!(data["latest_reading"]["gas_level"], 12.5);
    assert_eq!(data["latest_reading"]["sensor_location"], "FRESH-1 room");
    assert!(data["regulator_status"].is_null());

    let online = |sensor_id: &str| {
        data["sensor_status"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["sensor_id"] == sensor_id)
            .map(|s| s["is_online"].as_bool().unwrap())
            .unwrap()
    };
    assert!(online("FRESH-1"));
    assert!(!online("STALE-1"));
    assert!(!online("EDGE-1"));
    assert!(!online("SILENT-1"));

    // Regulator snapshot appears once the regulator exists
    app.send("GET", "/regulator/control/", &token, None).await;
    let (_, body) = app.send("GET", "/dashboard/", &token, None).await;
    assert_eq!(body["data"]["regulator_status"]["pressure"], 15.2);
}

#[tokio::test]
async fn test_scan_with_leak_raises_alert() {
    let app = spawn_app(FixedTelemetry::new(0.5, true)).await;
    let (_, token) = app.user("pete").await;
    let leak_sensor = app.sensor(&token, "LEAK-1", "GAS_LEAK").await;

    let (status, body) = app.send("POST", "/gas-leak/scan/", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    let scan = &body["data"];
    assert_eq!(scan["leak_detected"], true);
    assert_eq!(scan["gas_level"], 50.0);
    assert_eq!(scan["scan_duration"], 30);
    assert!((1000..=9999).contains(&scan["scan_id"].as_i64().unwrap()));

    let (_, body) = app.send("GET", "/alerts/?unacknowledged=true", &token, None).await;
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "LEAK_DETECTED");
    assert_eq!(alerts[0]["message"], "Gas leak detected with level 50.0%");
    assert_eq!(alerts[0]["sensor"], leak_sensor);

    let (_, body) = app.send("GET", "/gas-leak/status/", &token, None).await;
    assert_eq!(body["data"]["status"], "LEAK_DETECTED");
    assert_eq!(body["data"]["gas_level"], 50.0);
    assert_eq!(body["data"]["sensor_count"], 1);

    let (_, body) = app.send("GET", "/dashboard/", &token, None).await;
    assert_eq!(body["data"]["active_alerts"], 1);
    assert_eq!(body["data"]["recent_alerts"][0]["type"], "LEAK_DETECTED");

    let alert_id = alerts[0]["id"].as_i64().unwrap();

    let (_, other_token) = app.user("quinn").await;
    let (status, body) = app
        .send(
            "POST",
            &format!("/alerts/{alert_id}/acknowledge/"),
            &other_token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], 0);
    assert_eq!(body["message"], "Alert not found");

    let (status, body) = app
        .send("POST", &format!("/alerts/{alert_id}/acknowledge/"), &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_acknowledged"], true);
    assert!(body["data"]["acknowledged_at"].is_string());

    let (_, body) = app.send("GET", "/alerts/?unacknowledged=true", &token, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app.send("GET", "/alerts/", &token, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_scan_without_leak_sensor_persists_nothing() {
    let app = spawn_app(FixedTelemetry::new(0.5, true)).await;
    let (_, token) = app.user("quinn").await;

    let (status, body) = app.send("POST", "/gas-leak/scan/", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["leak_detected"], true);

    let (_, body) = app.send("GET", "/alerts/", &token, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app.send("GET", "/gas-leak/status/", &token, None).await;
    assert_eq!(body["data"]["status"], "SAFE");
    assert_eq!(body["data"]["sensor_count"], 0);
}

#[tokio::test]
async fn test_gas_level_data_shape() {
    let app = spawn_app(FixedTelemetry::new(0.0, false)).await;
    let (_, token) = app.user("rosa").await;
    app.sensor(&token, "TANK-1", "GAS_LEVEL").await;

    let (status, body) = app.send("GET", "/gas-level/data/", &token, None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["current_level"], 60.0);
    assert_eq!(data["estimated_hours"], 20.0);
    assert_eq!(data["sensor_count"], 1);

    let points = data["recent_readings"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    for point in points {
        assert_eq!(point["status"], "Good");
        assert_eq!(point["level"], 55.0);
        assert_eq!(point["time"].as_str().unwrap().len(), 5);
    }
}

#[tokio::test]
async fn test_sensor_registration_and_readings() {
    let app = spawn_app(FixedTelemetry::default()).await;
    let (_, token) = app.user("sam").await;
    let (_, other) = app.user("tess").await;
    let sensor = app.sensor(&token, "KITCHEN-1", "GAS_LEAK").await;

    let (status, body) = app
        .send(
            "POST",
            "/sensors/",
            &other,
            Some(json!({
                "sensor_id": "KITCHEN-1",
                "sensor_name": "dup",
                "location": "x",
                "sensor_type": "SMOKE",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["sensor_type"].is_array());

    let (status, body) = app
        .send(
            "POST",
            "/sensors/",
            &other,
            Some(json!({
                "sensor_id": "KITCHEN-1",
                "sensor_name": "dup",
                "location": "x",
                "sensor_type": "GAS_LEAK",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["sensor_id"].is_array());

    let sensors = app.state.store().sensor_repo();
    let now = Utc::now();
    for minutes in [30_i32, 20, 10] {
        sensors
            .record_reading(
                sensor,
                reading(f64::from(minutes), false),
                now - Duration::minutes(i64::from(minutes)),
            )
            .await
            .unwrap();
    }

    let uri = format!("/sensors/{sensor}/readings/?limit=2");
    let (status, body) = app.send("GET", &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK);
    let levels: Vec<f64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["gas_level"].as_f64().unwrap())
        .collect();
    assert_eq!(levels, [10.0, 20.0]);

    let (status, _) = app.send("GET", &uri, &other, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send("GET", &format!("/sensors/{sensor}/readings/?limit=0"), &token, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["limit"].is_array());

    let (_, body) = app.send("GET", "/sensors/", &other, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_image_upload() {
    let app = spawn_app(FixedTelemetry::default()).await;
    let (user_id, token) = app.user("uma").await;

    let (status, body) = app
        .send("POST", "/profile/upload-image/", &token, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image data provided");

    let (status, body) = app
        .send(
            "POST",
            "/profile/upload-image/",
            &token,
            Some(json!({"image_data": "@@not base64@@"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid image data");

    let bytes = [0xFF_u8, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    let (status, body) = app
        .send(
            "POST",
            "/profile/upload-image/",
            &token,
            Some(json!({"image_data": format!("data:image/jpeg;base64,{encoded}")})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile image uploaded successfully");

    let url = body["data"]["image_url"].as_str().unwrap().to_string();
    let prefix = format!("/media/profile_images/{user_id}_");
    assert!(url.starts_with(&prefix), "unexpected url {url}");

    let stored = app.media_path.join(url.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(&stored).unwrap(), bytes);

    let (_, body) = app.send("GET", "/profile/", &token, None).await;
    assert_eq!(body["data"]["profile_image"], url.as_str());

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
