//! End-to-end tests for the full roomhubd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`. No TCP port is bound.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use roomhub_adapter_http_axum::router;
use roomhubd::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Build a fully-wired router backed by an in-memory `SQLite` database, with
/// an `admin` superuser.
async fn app() -> Router {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.admin.username = Some("admin".to_string());
    config.admin.password = Some("admin-password".to_string());

    let state = roomhubd::build_state(&config)
        .await
        .expect("in-memory application should initialise");
    router::build(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Register `username` and return its access token.
async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/accounts/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["access"].as_str().unwrap().to_string()
}

async fn login_admin(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/accounts/login",
        None,
        Some(json!({ "username": "admin", "password": "admin-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access"].as_str().unwrap().to_string()
}

async fn create_room(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/rooms",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_analog_device(app: &Router, token: &str, room: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/analog-devices",
        Some(token),
        Some(json!({
            "mac_address": "AA:BB:CC:DD:EE:FF",
            "name": name,
            "ip": "192.168.1.20",
            "room": room,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Health & accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn should_register_regular_account_and_resolve_it_from_token() {
    let app = app().await;
    let token = register(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, "/api/accounts/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_staff"], false);
}

#[tokio::test]
async fn should_reject_duplicate_username() {
    let app = app().await;
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/accounts/register",
        None,
        Some(json!({ "username": "alice", "password": "other" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_not_reveal_which_credential_was_wrong() {
    let app = app().await;
    register(&app, "alice").await;

    let (wrong_password, body_a) = send(
        &app,
        Method::POST,
        "/api/accounts/login",
        None,
        Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    let (unknown_user, body_b) = send(
        &app,
        Method::POST,
        "/api/accounts/login",
        None,
        Some(json!({ "username": "mallory", "password": "nope" })),
    )
    .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, json!({ "error": "Invalid credentials" }));
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn should_issue_new_access_token_on_refresh() {
    let app = app().await;
    let (_, login) = send(
        &app,
        Method::POST,
        "/api/accounts/register",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    let refresh = login["refresh"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/accounts/token/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refresh"], refresh);
    assert_ne!(body["access"], login["access"]);
    let access = body["access"].as_str().unwrap();
    let (status, _) = send(&app, Method::GET, "/api/accounts/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_not_accept_refresh_token_as_access_token() {
    let app = app().await;
    let (_, login) = send(
        &app,
        Method::POST,
        "/api/accounts/register",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    let refresh = login["refresh"].as_str().unwrap();

    let (status, _) = send(&app, Method::GET, "/api/rooms", Some(refresh), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_tokens_after_logout() {
    let app = app().await;
    let (_, login) = send(
        &app,
        Method::POST,
        "/api/accounts/register",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    let access = login["access"].as_str().unwrap();
    let refresh = login["refresh"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/accounts/logout",
        Some(access),
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/accounts/me", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/accounts/token/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_return_401_without_token() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/rooms", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Rooms, devices and values
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_show_latest_reading_in_room_view() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;

    for reading in [10.0, 12.5] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/analog-values",
            Some(&alice),
            Some(json!({ "device": device, "value": reading })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, view) = send(
        &app,
        Method::GET,
        &format!("/api/rooms/{room}"),
        Some(&alice),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["owner"], "alice");
    let devices = view["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["type"], "Analog");
    assert_eq!(devices[0]["name"], "Thermometer");
    assert_eq!(devices[0]["value"], 12.5);
}

#[tokio::test]
async fn should_forbid_deleting_a_device_in_someone_elses_room() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    create_room(&app, &bob, "Garage").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;
    let uri = format!("/api/analog-devices/{device}");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You are not authorized to delete this device.");
    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_scope_listings_to_owned_rooms_for_non_staff() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let admin = login_admin(&app).await;
    let room = create_room(&app, &alice, "Kitchen").await;
    create_analog_device(&app, &alice, room, "Thermometer").await;

    let (_, for_bob) = send(&app, Method::GET, "/api/analog-devices", Some(&bob), None).await;
    let (_, for_admin) = send(&app, Method::GET, "/api/analog-devices", Some(&admin), None).await;
    let (_, rooms_for_bob) = send(&app, Method::GET, "/api/rooms", Some(&bob), None).await;

    assert_eq!(for_bob, json!([]));
    assert_eq!(for_admin.as_array().unwrap().len(), 1);
    assert_eq!(rooms_for_bob, json!([]));
}

#[tokio::test]
async fn should_move_device_only_when_staff() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let admin = login_admin(&app).await;
    let kitchen = create_room(&app, &alice, "Kitchen").await;
    let garage = create_room(&app, &bob, "Garage").await;
    let device = create_analog_device(&app, &alice, kitchen, "Thermometer").await;
    let uri = format!("/api/analog-devices/{device}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "name": "Hygrometer", "room": garage })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"], kitchen);
    assert_eq!(body["name"], "Hygrometer");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "room": garage })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"], garage);
}

#[tokio::test]
async fn should_toggle_or_set_activation() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;
    let uri = format!("/api/analog-devices/{device}/activate");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "active": true }));

    let (_, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&alice),
        Some(json!({ "active": true })),
    )
    .await;
    assert_eq!(body["active"], true);

    let (_, body) = send(&app, Method::PATCH, &uri, Some(&alice), Some(json!({}))).await;
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn should_cascade_room_deletion_to_devices_and_values() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;
    let (_, value) = send(
        &app,
        Method::POST,
        "/api/analog-values",
        Some(&alice),
        Some(json!({ "device": device, "value": 21.0 })),
    )
    .await;
    let value = value["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/rooms/{room}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/analog-devices/{device}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/analog-values/{value}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_not_find_device_under_another_kind() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/digital-devices/{device}"),
        Some(&alice),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_validate_readings_against_device_kind() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/analog-values",
        Some(&alice),
        Some(json!({ "device": device, "value": "warm" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/analog-values",
        Some(&alice),
        Some(json!({ "device": device + 100, "value": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/analog-values",
        Some(&alice),
        Some(json!({ "value": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "device is required");
}

#[tokio::test]
async fn should_patch_analog_value_but_reject_partial_digital_update() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let analog = create_analog_device(&app, &alice, room, "Thermometer").await;
    let (_, digital) = send(
        &app,
        Method::POST,
        "/api/digital-devices",
        Some(&alice),
        Some(json!({
            "mac_address": "11:22:33:44:55:66",
            "name": "Relay",
            "ip": "192.168.1.21",
            "room": room,
        })),
    )
    .await;
    let digital = digital["id"].as_i64().unwrap();

    let (_, analog_value) = send(
        &app,
        Method::POST,
        "/api/analog-values",
        Some(&alice),
        Some(json!({ "device": analog, "value": 10.0 })),
    )
    .await;
    let (_, digital_value) = send(
        &app,
        Method::POST,
        "/api/digital-values",
        Some(&alice),
        Some(json!({ "device": digital, "value": 1 })),
    )
    .await;
    assert_eq!(digital_value["value"], true);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/analog-values/{}", analog_value["id"]),
        Some(&alice),
        Some(json!({ "value": 11.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], 11.5);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/digital-values/{}", digital_value["id"]),
        Some(&alice),
        Some(json!({ "value": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/digital-values/{}", digital_value["id"]),
        Some(&alice),
        Some(json!({ "device": digital, "value": "false" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], false);
}

#[tokio::test]
async fn should_reserve_value_updates_to_the_room_owner() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let admin = login_admin(&app).await;
    let room = create_room(&app, &alice, "Kitchen").await;
    let device = create_analog_device(&app, &alice, room, "Thermometer").await;
    let (_, value) = send(
        &app,
        Method::POST,
        "/api/analog-values",
        Some(&alice),
        Some(json!({ "device": device, "value": 10.0 })),
    )
    .await;
    let uri = format!("/api/analog-values/{}", value["id"]);

    // The bootstrap admin is a superuser, which passes every rule.
    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&admin),
        Some(json!({ "value": 9.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let bob = register(&app, "bob").await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&bob),
        Some(json!({ "value": 8.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You are not allowed to change the value of the device.");
}

#[tokio::test]
async fn should_reject_malformed_path_id() {
    let app = app().await;
    let alice = register(&app, "alice").await;

    let (status, _) = send(&app, Method::GET, "/api/rooms/abc", Some(&alice), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reserve_room_reassignment_to_staff() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let (_, me) = send(&app, Method::GET, "/api/accounts/me", Some(&alice), None).await;
    let bob = register(&app, "bob").await;
    let (_, bob_me) = send(&app, Method::GET, "/api/accounts/me", Some(&bob), None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rooms",
        Some(&alice),
        Some(json!({ "name": "Attic", "owner": bob_me["user_id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only an admin can assign a room to another user.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rooms",
        Some(&alice),
        Some(json!({ "name": "Attic" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["owner"], me["user_id"]);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_let_only_staff_change_settings() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let admin = login_admin(&app).await;

    let (status, _) = send(&app, Method::GET, "/api/settings", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings",
        Some(&alice),
        Some(json!({ "broker_ip": "10.0.0.1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings",
        Some(&admin),
        Some(json!({ "broker_ip": "10.0.0.1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/settings", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "broker_ip": "10.0.0.1" }));
}
