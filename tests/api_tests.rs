use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use gaswatch::config::Config;
use gaswatch::services::FixedTelemetry;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const PASSWORD: &str = "correct-horse-battery";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.media_path = std::env::temp_dir()
        .join(format!("gaswatch-api-test-{}", uuid::Uuid::new_v4()))
        .display()
        .to_string();
    config.security.jwt_secret = "test-secret-test-secret-test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app_with(telemetry: FixedTelemetry) -> (Arc<gaswatch::api::AppState>, Router) {
    let state = gaswatch::api::create_app_state_with_telemetry(test_config(), Arc::new(telemetry))
        .await
        .expect("Failed to create app state");
    (state.clone(), gaswatch::api::router(state))
}

async fn spawn_app() -> Router {
    spawn_app_with(FixedTelemetry::default()).await.1
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register(app: &Router, username: &str, email: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/auth/register/",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "password": PASSWORD,
            "device_unique_code": format!("DEVICE-{username}"),
        })),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/auth/login/",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await
}

/// Registers a user and returns its access token.
async fn access_token(app: &Router, username: &str) -> String {
    let email = format!("{username}@example.com");
    let (status, _) = register(app, username, &email).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = login(app, &email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    body["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_and_duplicate_email() {
    let app = spawn_app().await;

    let (status, body) = register(&app, "alice", "alice@example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], 1);
    assert_eq!(body["message"], "User registered successfully!");
    assert_eq!(body["email"], "alice@example.com");

    let (status, body) = register(&app, "alice2", "alice@example.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], 0);
    assert_eq!(body["message"], "Registration failed");
    assert!(body["errors"]["email"].is_array());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register/",
        None,
        Some(json!({
            "username": "bad name",
            "email": "not-an-email",
            "password": "short",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], 0);
    assert_eq!(body["message"], "Registration failed");
    for field in ["username", "email", "password", "device_unique_code"] {
        assert!(body["errors"][field].is_array(), "missing error for {field}");
    }
}

#[tokio::test]
async fn test_taken_email_reported_with_other_field_errors() {
    let app = spawn_app().await;
    let (status, _) = register(&app, "zed", "zed@example.com").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register/",
        None,
        Some(json!({
            "username": "zed2",
            "email": "zed@example.com",
            "password": PASSWORD,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Registration failed");
    assert_eq!(
        body["errors"]["email"][0],
        "A user with this email already exists."
    );
    assert!(body["errors"]["device_unique_code"].is_array());

    // A malformed email is not looked up.
    let (_, body) = send(
        &app,
        "POST",
        "/auth/register/",
        None,
        Some(json!({"username": "zed3", "email": "zed@", "password": "short"})),
    )
    .await;
    assert_eq!(body["errors"]["email"][0], "Enter a valid email address.");
    assert_eq!(body["errors"]["email"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_returns_tokens_and_device_code() {
    let app = spawn_app().await;
    register(&app, "bob", "bob@example.com").await;

    let (status, body) = login(&app, "bob@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 1);
    assert_eq!(body["message"], "Login successful!");
    assert_eq!(body["email"], "bob@example.com");
    assert_eq!(body["device_unique_code"], "DEVICE-bob");
    assert!(body["access"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = spawn_app().await;
    register(&app, "carol", "carol@example.com").await;

    let (status, wrong_password) = login(&app, "carol@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, unknown_user) = login(&app, "nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["message"], "Login failed");
    assert_eq!(
        wrong_password["errors"]["non_field_errors"][0],
        "Invalid email or password."
    );
}

#[tokio::test]
async fn test_disabled_user_cannot_login_or_use_token() {
    let (state, app) = spawn_app_with(FixedTelemetry::default()).await;
    let token = access_token(&app, "dave").await;

    let (user, _) = state
        .store()
        .user_repo()
        .get_by_email_with_password("dave@example.com")
        .await
        .unwrap()
        .unwrap();
    state.store().user_repo().set_active(user.id, false).await.unwrap();

    let (status, _) = login(&app, "dave@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/dashboard/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_without_profile_has_no_device_code() {
    use gaswatch::entities::user_profiles;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    let (state, app) = spawn_app_with(FixedTelemetry::default()).await;
    register(&app, "nora", "nora@example.com").await;

    let (user, _) = state
        .store()
        .user_repo()
        .get_by_email_with_password("nora@example.com")
        .await
        .unwrap()
        .unwrap();
    user_profiles::Entity::delete_many()
        .filter(user_profiles::Column::UserId.eq(user.id))
        .exec(&state.store().conn)
        .await
        .unwrap();

    let (status, body) = login(&app, "nora@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());
    assert!(body["device_unique_code"].is_null());
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = spawn_app().await;
    register(&app, "erin", "erin@example.com").await;
    let (_, tokens) = login(&app, "erin@example.com", PASSWORD).await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/token/refresh/",
        None,
        Some(json!({"refresh": tokens["refresh"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "GET", "/profile/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/token/refresh/",
        None,
        Some(json!({"refresh": tokens["access"]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], 0);

    // A refresh token is not an access token
    let refresh = tokens["refresh"].as_str().unwrap();
    let (status, _) = send(&app, "GET", "/profile/", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    for (method, uri) in [
        ("GET", "/dashboard/"),
        ("GET", "/gas-leak/status/"),
        ("POST", "/gas-leak/scan/"),
        ("GET", "/gas-level/data/"),
        ("GET", "/pipeline/health/"),
        ("GET", "/regulator/control/"),
        ("GET", "/emergency/contacts/"),
        ("POST", "/emergency/sos/"),
        ("GET", "/profile/"),
        ("GET", "/metrics"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["success"], 0);
    }

    let (status, _) = send(&app, "GET", "/dashboard/", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pipeline_health_seeds_once() {
    let app = spawn_app().await;
    let token = access_token(&app, "frank").await;

    let (status, first) = send(&app, "GET", "/pipeline/health/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["sections"].as_array().unwrap().len(), 4);
    assert_eq!(first["data"]["overall_health"], 87.5);

    let (_, second) = send(&app, "GET", "/pipeline/health/", Some(&token), None).await;
    assert_eq!(second["data"]["sections"].as_array().unwrap().len(), 4);
    assert_eq!(second["data"]["overall_health"], 87.5);
}

#[tokio::test]
async fn test_pipeline_maintenance_schedule() {
    let app = spawn_app().await;
    let token = access_token(&app, "gina").await;

    for (title, date) in [
        ("Late", "2031-03-01T10:00:00Z"),
        ("Early", "2030-01-01T10:00:00Z"),
        ("Middle", "2030-06-01T10:00:00Z"),
        ("Latest", "2032-01-01T10:00:00Z"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/pipeline/maintenance/",
            Some(&token),
            Some(json!({"title": title, "scheduled_date": date, "priority": "HIGH"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", "/pipeline/health/", Some(&token), None).await;
    let titles: Vec<&str> = body["data"]["maintenance_schedule"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Early", "Middle", "Late"]);

    let (status, body) = send(
        &app,
        "POST",
        "/pipeline/maintenance/",
        Some(&token),
        Some(json!({"title": "Bad", "scheduled_date": "tomorrow"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["scheduled_date"].is_array());
}

#[tokio::test]
async fn test_complete_maintenance() {
    let app = spawn_app().await;
    let token = access_token(&app, "olga").await;
    let other = access_token(&app, "otto").await;

    let mut ids = Vec::new();
    for (title, date) in [
        ("Valve check", "2030-02-01T09:00:00Z"),
        ("Meter swap", "2030-03-01T09:00:00Z"),
        ("Overdue", "2001-01-01T09:00:00Z"),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/pipeline/maintenance/",
            Some(&token),
            Some(json!({"title": title, "scheduled_date": date})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["priority"], "MEDIUM");
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (status, body) = send(
        &app,
        "POST",
        &format!("/pipeline/maintenance/{}/complete/", ids[0]),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Maintenance item not found");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/pipeline/maintenance/{}/complete/", ids[0]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_completed"], true);

    // Completed and past-dated items are not upcoming.
    let (_, body) = send(&app, "GET", "/pipeline/health/", Some(&token), None).await;
    let titles: Vec<&str> = body["data"]["maintenance_schedule"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Meter swap"]);
}

#[tokio::test]
async fn test_malformed_path_and_query_use_error_envelope() {
    let app = spawn_app().await;
    let token = access_token(&app, "pia").await;

    for (method, uri) in [
        ("DELETE", "/emergency/contacts/abc/delete/"),
        ("POST", "/alerts/x/acknowledge/"),
        ("POST", "/pipeline/maintenance/first/complete/"),
        ("GET", "/sensors/one/readings/"),
        ("GET", "/sensors/1/readings/?limit=-1"),
    ] {
        let (status, body) = send(&app, method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body["success"], 0, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_emergency_contacts_and_sos() {
    let app = spawn_app().await;
    let token = access_token(&app, "hank").await;

    let (status, body) = send(&app, "POST", "/emergency/sos/", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], 0);
    assert_eq!(body["message"], "No emergency contacts found");

    for (name, primary) in [("Zed", false), ("Amy", false), ("Mum", true)] {
        let (status, body) = send(
            &app,
            "POST",
            "/emergency/contacts/",
            Some(&token),
            Some(json!({
                "name": name,
                "phone_number": "+15550000000",
                "relationship": "Family",
                "is_primary": primary,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Contact added successfully");
    }

    let (_, body) = send(&app, "GET", "/emergency/contacts/", Some(&token), None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Mum", "Amy", "Zed"]);

    let (status, body) = send(&app, "POST", "/emergency/sos/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Emergency SOS triggered successfully");
    assert_eq!(body["data"]["contacts_called"], 3);
    assert_eq!(body["data"]["estimated_response_time"], "5-10 minutes");
    let sos_id = body["data"]["sos_id"].as_i64().unwrap();
    assert!((10000..=99999).contains(&sos_id));
}

#[tokio::test]
async fn test_contact_validation_and_double_delete() {
    let app = spawn_app().await;
    let token = access_token(&app, "ivy").await;

    let (status, body) = send(
        &app,
        "POST",
        "/emergency/contacts/",
        Some(&token),
        Some(json!({"name": "", "phone_number": "not a phone"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["name", "phone_number", "relationship"] {
        assert!(body["errors"][field].is_array(), "missing error for {field}");
    }

    let (_, body) = send(
        &app,
        "POST",
        "/emergency/contacts/",
        Some(&token),
        Some(json!({"name": "Neighbour", "phone_number": "911", "relationship": "Friend"})),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/emergency/contacts/{id}/delete/");

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact deleted");

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact not found");

    let (_, body) = send(&app, "GET", "/emergency/contacts/", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_contacts_are_scoped_to_owner() {
    let app = spawn_app().await;
    let owner = access_token(&app, "jack").await;
    let other = access_token(&app, "jill").await;

    let (_, body) = send(
        &app,
        "POST",
        "/emergency/contacts/",
        Some(&owner),
        Some(json!({"name": "Dad", "phone_number": "12345", "relationship": "Parent"})),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/emergency/contacts/{id}/delete/"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/emergency/contacts/", Some(&other), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_regulator_control() {
    let app = spawn_app().await;
    let token = access_token(&app, "kim").await;

    let (status, body) = send(&app, "GET", "/regulator/control/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert!(data["regulator_id"].as_str().unwrap().starts_with("REG_"));
    assert_eq!(data["is_on"], true);
    assert_eq!(data["auto_mode"], true);
    assert_eq!(data["current_pressure"], 15.2);
    assert_eq!(data["flow_rate"], 2.5);
    assert_eq!(data["temperature"], 22.5);

    let (status, body) = send(
        &app,
        "POST",
        "/regulator/control/",
        Some(&token),
        Some(json!({"action": "toggle_power"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Regulator toggle_power completed");
    assert_eq!(body["data"]["is_on"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/regulator/control/",
        Some(&token),
        Some(json!({"action": "update_settings", "current_pressure": 14.1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Regulator update_settings completed");
    assert_eq!(body["data"]["current_pressure"], 14.1);
    assert_eq!(body["data"]["flow_rate"], 2.5);
    assert_eq!(body["data"]["is_on"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/regulator/control/",
        Some(&token),
        Some(json!({"action": "update_settings", "flow_rate": "fast"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["flow_rate"].is_array());

    let (status, body) = send(
        &app,
        "POST",
        "/regulator/control/",
        Some(&token),
        Some(json!({"action": "self_destruct"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["action"].is_array());

    let (_, body) = send(&app, "GET", "/regulator/control/", Some(&token), None).await;
    assert_eq!(body["data"]["current_pressure"], 14.1);
}

#[tokio::test]
async fn test_profile_partial_update() {
    let app = spawn_app().await;
    let token = access_token(&app, "leo").await;

    let (status, body) = send(&app, "GET", "/profile/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "leo");
    assert_eq!(body["data"]["device_unique_code"], "DEVICE-leo");

    let (status, body) = send(
        &app,
        "PUT",
        "/profile/",
        Some(&token),
        Some(json!({"phone_number": "+15551234567"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");

    let (_, body) = send(&app, "GET", "/profile/", Some(&token), None).await;
    assert_eq!(body["data"]["phone_number"], "+15551234567");
    assert_eq!(body["data"]["username"], "leo");
    assert_eq!(body["data"]["email"], "leo@example.com");
}

#[tokio::test]
async fn test_profile_update_rejects_taken_email() {
    let app = spawn_app().await;
    access_token(&app, "mia").await;
    let token = access_token(&app, "ned").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/profile/",
        Some(&token),
        Some(json!({"email": "mia@example.com", "notification_preferences": {"push": true}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());

    let (_, body) = send(&app, "GET", "/profile/", Some(&token), None).await;
    assert_eq!(body["data"]["email"], "ned@example.com");
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login/")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], 0);
    assert!(body["message"].is_string());
}
