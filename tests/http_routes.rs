mod common;

use axum::http::StatusCode;
use common::{create_review, register, send, sign_in, test_app, ADMIN_EMAIL, PASSWORD};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_and_sign_in() {
    let (app, _) = test_app().await;
    let id = register(&app, "reader@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/sign-in",
        None,
        Some(json!({"email": "reader@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id.to_string());
    assert_eq!(body["user"]["roles"], json!(["user"]));
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["accessToken"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let (app, _) = test_app().await;
    register(&app, "reader@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/sign-in",
        None,
        Some(json!({"email": "reader@example.com", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "services.AUTH.ERRORS.INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _) = test_app().await;
    register(&app, "reader@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/user/create",
        None,
        Some(json!({
            "email": "reader@example.com",
            "username": "again",
            "displayName": "Again",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "services.USER.ERRORS.EXISTS");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _) = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/user/create",
        None,
        Some(json!({"email": "missing-fields@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "common.ERRORS.INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_verify_returns_caller_and_window() {
    let (app, _) = test_app().await;
    let id = register(&app, "reader@example.com").await;
    let token = sign_in(&app, "reader@example.com").await;

    let (status, body) = send(&app, "GET", "/api/v1/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["email"], "reader@example.com");
    assert_eq!(body["displayName"], "Reader");
    assert!(body["exp"].as_i64().unwrap() > body["iat"].as_i64().unwrap());
}

#[tokio::test]
async fn test_user_listing_and_lookup() {
    let (app, _) = test_app().await;
    let id = register(&app, "reader@example.com").await;
    let token = sign_in(&app, "reader@example.com").await;

    let (status, body) = send(&app, "GET", "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("roles").is_none()));

    let (status, body) = send(&app, "GET", &format!("/api/v1/user/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "reader");

    let (status, body) = send(&app, "GET", "/api/v1/user/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "services.USER.ERRORS.INVALID_ID");

    let missing = Uuid::new_v4();
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/user/{missing}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_own_profile() {
    let (app, _) = test_app().await;
    let id = register(&app, "reader@example.com").await;
    let token = sign_in(&app, "reader@example.com").await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/v1/user/update",
        Some(&token),
        Some(json!({"displayName": "Avid Reader"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated");

    let (_, body) = send(&app, "GET", &format!("/api/v1/user/{id}"), Some(&token), None).await;
    assert_eq!(body["displayName"], "Avid Reader");
}

#[tokio::test]
async fn test_delete_self_needs_password_confirmation() {
    let (app, _) = test_app().await;
    register(&app, "reader@example.com").await;
    let token = sign_in(&app, "reader@example.com").await;

    let (status, body) = send(&app, "DELETE", "/api/v1/user/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "services.USER.ERRORS.MISSING_DATA");

    let (status, body) = send(
        &app,
        "DELETE",
        "/api/v1/user/delete",
        Some(&token),
        Some(json!({"password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "services.AUTH.ERRORS.PASSWORD_NOT_MATCH");

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/v1/user/delete",
        Some(&token),
        Some(json!({"password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The token outlives the account but no longer resolves to a user.
    let (status, _) = send(&app, "GET", "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_review_crud_for_owner() {
    let (app, _) = test_app().await;
    let author = register(&app, "reader@example.com").await;
    let token = sign_in(&app, "reader@example.com").await;
    let review = create_review(&app, &token).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/reviews/{review}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], author.to_string());
    assert_eq!(body["rating"], 5);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/reviews/update/{review}"),
        Some(&token),
        Some(json!({"rating": 4, "title": "Mostly holds up"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/v1/reviews/user/{author}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["username"], "reader");
    assert_eq!(body["reviews"][0]["title"], "Mostly holds up");
    assert_eq!(body["reviews"][0]["rating"], 4);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/reviews/delete/{review}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/reviews/{review}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "services.REVIEW.ERRORS.NOT_FOUND");

    let (_, body) = send(&app, "GET", "/api/v1/reviews", Some(&token), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_signs_in_with_bootstrap_credentials() {
    let (app, _) = test_app().await;
    let token = sign_in(&app, ADMIN_EMAIL).await;
    let (status, body) = send(&app, "GET", "/api/v1/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!(["user", "admin"]));
}
