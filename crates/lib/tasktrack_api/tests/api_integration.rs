//! Integration tests: build the router over the in-memory store and drive it
//! with `oneshot` requests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tasktrack_api::{AppState, config::ApiConfig};
use tasktrack_core::config::AuthConfig;
use tasktrack_core::models::auth::Role;
use tasktrack_core::seed;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin123";

fn auth_config(secret: &str) -> AuthConfig {
    AuthConfig::new(secret, "HS256", Duration::minutes(30), 4).expect("auth config")
}

async fn test_app() -> (AppState, Router) {
    let state = AppState::in_memory(ApiConfig::new(auth_config("test-secret"))).expect("state");
    seed::ensure_admin(state.users.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD, 4)
        .await
        .expect("seed admin");
    let app = tasktrack_api::router(state.clone());
    (state, app)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &Router, email: &str, username: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({ "email": email, "username": username, "password": password });
    send(app, json_request("POST", "/api/v1/auth/register", None, body)).await
}

async fn try_login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let form = format!(
        "username={}&password={}",
        email.replace('@', "%40"),
        password
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    send(app, req).await
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, json) = try_login(app, email, password).await;
    assert_eq!(status, StatusCode::OK, "login {email}: {json}");
    json["access_token"].as_str().expect("access_token").to_string()
}

/// Register and log in a regular user, returning (id, token).
async fn user(app: &Router, email: &str, username: &str) -> (i64, String) {
    let (status, json) = register(app, email, username, "secret123").await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {json}");
    let id = json["id"].as_i64().expect("id");
    (id, login(app, email, "secret123").await)
}

#[tokio::test]
async fn public_endpoints() {
    let (_, app) = test_app().await;

    let (status, json) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["version"].is_string());

    let (status, json) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn register_login_and_task_ownership() {
    let (_, app) = test_app().await;

    let (status, json) = register(&app, "alice@example.com", "alice", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["role"], "user");
    assert_eq!(json["is_active"], true);
    assert!(json.get("password_hash").is_none());
    assert!(json.get("hashed_password").is_none());

    let (status, json) = try_login(&app, "alice@example.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 1800);
    let alice = json["access_token"].as_str().unwrap().to_string();

    let (status, json) = send(&app, get("/api/v1/auth/me", Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["role"], "user");

    let (status, task) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tasks",
            Some(&alice),
            json!({ "title": "Write report", "priority": "high" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "high");
    let task_uri = format!("/api/v1/tasks/{}", task["id"]);

    let (status, _) = send(&app, get(&task_uri, Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, bob) = user(&app, "bob@example.com", "bob").await;
    let (status, json) = send(&app, get(&task_uri, Some(&bob))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Not enough permissions");

    let (status, json) = send(&app, get("/api/v1/tasks", Some(&bob))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 0);

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, _) = send(&app, get(&task_uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_or_bad_credentials_are_401() {
    let (state, app) = test_app().await;

    let (status, json) = send(&app, get("/api/v1/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Could not validate credentials");

    let resp = app
        .clone()
        .oneshot(get("/api/v1/tasks", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let basic = Request::builder()
        .uri("/api/v1/auth/me")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, basic).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (alice_id, _) = user(&app, "alice@example.com", "alice").await;

    let expired = state
        .tokens
        .issue(&alice_id.to_string(), Role::User, Utc::now() - Duration::minutes(31))
        .unwrap();
    let (status, json) = send(&app, get("/api/v1/auth/me", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Could not validate credentials");

    let forged = tasktrack_core::auth::jwt::TokenService::new(&auth_config("other-secret"))
        .issue(&alice_id.to_string(), Role::Admin, Utc::now())
        .unwrap();
    let (status, _) = send(&app, get("/api/v1/auth/me", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let ghost = state.tokens.issue("9999", Role::User, Utc::now()).unwrap();
    let (status, _) = send(&app, get("/api/v1/auth/me", Some(&ghost))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let (_, app) = test_app().await;
    user(&app, "alice@example.com", "alice").await;

    let (wrong_status, wrong) = try_login(&app, "alice@example.com", "nope-nope").await;
    let (unknown_status, unknown) = try_login(&app, "nobody@example.com", "secret123").await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["message"], unknown["message"]);

    // Email is matched case-insensitively.
    login(&app, "ALICE@example.com", "secret123").await;
}

#[tokio::test]
async fn registration_validation() {
    let (_, app) = test_app().await;
    user(&app, "alice@example.com", "alice").await;

    let (status, json) = register(&app, "alice@example.com", "alice2", "secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Email already registered");

    let (status, json) = register(&app, "alice2@example.com", "alice", "secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Username already taken");

    let (status, _) = register(&app, "not-an-email", "carol", "secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "carol@example.com", "ca", "secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "carol@example.com", "carol", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_endpoints_require_admin() {
    let (_, app) = test_app().await;
    let (alice_id, alice) = user(&app, "alice@example.com", "alice").await;

    let (status, _) = send(&app, get("/api/v1/users", Some(&alice))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let patch = json_request(
        "PATCH",
        &format!("/api/v1/users/{alice_id}"),
        Some(&alice),
        json!({ "role": "admin" }),
    );
    let (status, _) = send(&app, patch).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, json) = send(&app, get("/api/v1/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn role_and_status_changes_apply_to_existing_tokens() {
    let (_, app) = test_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (bob_id, bob) = user(&app, "bob@example.com", "bob").await;
    let bob_uri = format!("/api/v1/users/{bob_id}");

    let (status, json) = send(
        &app,
        json_request("PATCH", &bob_uri, Some(&admin), json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "admin");

    // Token issued while bob was a user now carries admin rights.
    let (status, _) = send(&app, get("/api/v1/users", Some(&bob))).await;
    assert_eq!(status, StatusCode::OK);

    send(
        &app,
        json_request("PATCH", &bob_uri, Some(&admin), json!({ "role": "user" })),
    )
    .await;
    let (status, _) = send(&app, get("/api/v1/users", Some(&bob))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        &app,
        json_request("PATCH", &bob_uri, Some(&admin), json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_active"], false);

    let (status, _) = send(&app, get("/api/v1/auth/me", Some(&bob))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = try_login(&app, "bob@example.com", "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_user_loses_access_and_tasks() {
    let (_, app) = test_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (bob_id, bob) = user(&app, "bob@example.com", "bob").await;

    send(
        &app,
        json_request("POST", "/api/v1/tasks", Some(&bob), json!({ "title": "t" })),
    )
    .await;

    let (status, json) = send(&app, delete(&format!("/api/v1/users/{bob_id}"), &admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);

    let (status, _) = send(&app, get("/api/v1/tasks", Some(&bob))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(&app, get("/api/v1/tasks", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn admin_cannot_act_on_self() {
    let (_, app) = test_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, me) = send(&app, get("/api/v1/auth/me", Some(&admin))).await;
    let uri = format!("/api/v1/users/{}", me["id"]);

    let (status, _) = send(&app, delete(&uri, &admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("PATCH", &uri, Some(&admin), json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_crud_and_paging() {
    let (_, app) = test_app().await;
    let (alice_id, alice) = user(&app, "alice@example.com", "alice").await;
    let (_, bob) = user(&app, "bob@example.com", "bob").await;

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let (status, task) = send(
            &app,
            json_request("POST", "/api/v1/tasks", Some(&alice), json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["user_id"], alice_id);
        ids.push(task["id"].as_i64().unwrap());
    }

    let (status, json) = send(&app, get("/api/v1/tasks?skip=1&limit=1", Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);
    let page = json.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["id"], ids[1]);

    let uri = format!("/api/v1/tasks/{}", ids[0]);
    let (status, json) = send(
        &app,
        json_request("PUT", &uri, Some(&alice), json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "completed");
    assert_eq!(json["title"], "one");

    let (status, _) = send(
        &app,
        json_request("PUT", &uri, Some(&alice), json!({ "title": "x".repeat(201) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/tasks", Some(&alice), json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("PUT", &uri, Some(&bob), json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, delete(&uri, &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, delete(&uri, &alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get(&uri, Some(&alice))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Missing task is 404 even for a caller who would not own it.
    let (status, _) = send(&app, get("/api/v1/tasks/424242", Some(&bob))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn multipart_login(fields: &[(&str, &str)]) -> Request<Body> {
    const BOUNDARY: &str = "tasktrack-form-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn login_accepts_multipart_form() {
    let (_, app) = test_app().await;

    let req = multipart_login(&[("username", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)]);
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    let token = json["access_token"].as_str().unwrap();

    let (status, me) = send(&app, get("/api/v1/auth/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "admin");

    let req = multipart_login(&[("username", ADMIN_EMAIL), ("password", "wrong-password")]);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = multipart_login(&[("username", ADMIN_EMAIL)]);
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn padded_titles_are_trimmed_before_the_length_check() {
    let (_, app) = test_app().await;
    let (_, alice) = user(&app, "alice@example.com", "alice").await;

    let fits = format!("  {}  ", "x".repeat(200));
    let (status, task) = send(
        &app,
        json_request("POST", "/api/v1/tasks", Some(&alice), json!({ "title": fits })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["title"].as_str().unwrap().chars().count(), 200);

    let uri = format!("/api/v1/tasks/{}", task["id"]);
    let (status, json) = send(
        &app,
        json_request("PUT", &uri, Some(&alice), json!({ "title": "  renamed \t" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "renamed");

    let too_long = format!(" {} ", "y".repeat(201));
    let (status, _) = send(
        &app,
        json_request("PUT", &uri, Some(&alice), json!({ "title": too_long })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/tasks", Some(&alice), json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_requests_get_json_error_bodies() {
    let (_, app) = test_app().await;
    let (_, alice) = user(&app, "alice@example.com", "alice").await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/tasks")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {alice}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
    assert!(json["message"].is_string());

    let (status, json) = send(
        &app,
        json_request("POST", "/api/v1/tasks", Some(&alice), json!({ "description": "no title" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "invalid_request");

    let (status, json) = send(&app, get("/api/v1/tasks/not-a-number", Some(&alice))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");

    let (status, json) = send(&app, get("/api/v1/tasks?limit=lots", Some(&alice))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}
