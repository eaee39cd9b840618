#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use readly::comms::http_api::{create_router, seed_bootstrap_admin, AppState};
use readly::config::{BootstrapAdmin, Config};
use readly::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const PASSWORD: &str = "passW@rd1";

pub fn test_config() -> Config {
    Config {
        jwt_secret: Some("integration-secret".to_string()),
        password_cost: 4,
        bootstrap_admin: Some(BootstrapAdmin {
            email: ADMIN_EMAIL.to_string(),
            username: "root".to_string(),
            display_name: "Root".to_string(),
            password: PASSWORD.to_string(),
        }),
        ..Config::default()
    }
}

/// Router over a fresh store with the bootstrap admin already seeded.
pub async fn test_app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(test_config(), Arc::new(store.clone())).unwrap();
    seed_bootstrap_admin(&state).await.unwrap();
    (create_router(Arc::new(state)), store)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn register(app: &Router, email: &str) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/user/create",
        None,
        Some(json!({
            "email": email,
            "username": email.split('@').next().unwrap(),
            "displayName": "Reader",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["id"].as_str().unwrap().parse().unwrap()
}

pub async fn sign_in(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/auth/sign-in",
        None,
        Some(json!({"email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {body}");
    body["accessToken"].as_str().unwrap().to_string()
}

pub async fn create_review(app: &Router, token: &str) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/reviews/create",
        Some(token),
        Some(json!({
            "bookReference": "isbn:9780441013593",
            "title": "Still holds up",
            "content": "Spice, politics and sand.",
            "authors": ["Frank Herbert"],
            "rating": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create review failed: {body}");
    body["id"].as_str().unwrap().parse().unwrap()
}
