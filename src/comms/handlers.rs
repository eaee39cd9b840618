use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::extract::{IdParam, JsonBody};
use super::http_api::SharedState;
use crate::domain::{Review, User};
use crate::errors::AppError;
use crate::messages::{translate, MessageKey};
use crate::security::guard::{Caller, TokenWindow};
use crate::services::{NewReview, NewUser, ReviewChanges, UserChanges, UserReviews};

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    #[serde(flatten)]
    pub caller: Caller,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteConfirmation {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl MessageResponse {
    fn new(key: MessageKey) -> Json<Self> {
        Json(Self {
            message: translate(key),
            id: None,
        })
    }

    fn created(key: MessageKey, id: Uuid) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self {
                message: translate(key),
                id: Some(id),
            }),
        )
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// Auth

pub async fn sign_in(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let signed = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(Json(SignInResponse {
        user: signed.user,
        access_token: signed.access_token,
    }))
}

pub async fn verify(
    caller: Caller,
    Extension(window): Extension<TokenWindow>,
) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        caller,
        iat: window.iat,
        exp: window.exp,
    })
}

// Users

pub async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

pub async fn get_user(
    State(state): State<SharedState>,
    IdParam(id): IdParam,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(id).await?))
}

pub async fn create_user(
    State(state): State<SharedState>,
    JsonBody(data): JsonBody<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create(data).await?;
    Ok(MessageResponse::created(MessageKey::UserCreated, user.id))
}

pub async fn update_self(
    State(state): State<SharedState>,
    caller: Caller,
    JsonBody(changes): JsonBody<UserChanges>,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.update(caller.id, changes).await?;
    Ok(MessageResponse::new(MessageKey::UserUpdated))
}

pub async fn update_user(
    State(state): State<SharedState>,
    IdParam(id): IdParam,
    JsonBody(changes): JsonBody<UserChanges>,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.update(id, changes).await?;
    Ok(MessageResponse::new(MessageKey::UserUpdated))
}

/// The confirmation body is optional: an absent or unreadable body means no password was given.
pub async fn delete_self(
    State(state): State<SharedState>,
    caller: Caller,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let confirmation = serde_json::from_slice::<DeleteConfirmation>(&body)
        .ok()
        .and_then(|c| c.password);
    state.users.delete_self(&caller, confirmation).await?;
    Ok(MessageResponse::new(MessageKey::UserDeleted))
}

pub async fn delete_user(
    State(state): State<SharedState>,
    caller: Caller,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.delete_by_id(&caller, id).await?;
    Ok(MessageResponse::new(MessageKey::UserDeleted))
}

// Reviews

pub async fn list_reviews(State(state): State<SharedState>) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.reviews.list().await?))
}

pub async fn get_review(
    State(state): State<SharedState>,
    IdParam(id): IdParam,
) -> Result<Json<Review>, AppError> {
    Ok(Json(state.reviews.get(id).await?))
}

pub async fn list_user_reviews(
    State(state): State<SharedState>,
    IdParam(user_id): IdParam,
) -> Result<Json<UserReviews>, AppError> {
    Ok(Json(state.reviews.list_by_user(user_id).await?))
}

pub async fn create_review(
    State(state): State<SharedState>,
    caller: Caller,
    JsonBody(data): JsonBody<NewReview>,
) -> Result<impl IntoResponse, AppError> {
    let review = state.reviews.create(&caller, data).await?;
    Ok(MessageResponse::created(MessageKey::ReviewCreated, review.id))
}

pub async fn update_review(
    State(state): State<SharedState>,
    caller: Caller,
    IdParam(id): IdParam,
    JsonBody(changes): JsonBody<ReviewChanges>,
) -> Result<Json<MessageResponse>, AppError> {
    state.reviews.update(&caller, id, changes).await?;
    Ok(MessageResponse::new(MessageKey::ReviewUpdated))
}

pub async fn delete_review(
    State(state): State<SharedState>,
    caller: Caller,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    state.reviews.delete(&caller, id).await?;
    Ok(MessageResponse::new(MessageKey::ReviewDeleted))
}

// Roles

pub async fn promote_admin(
    State(state): State<SharedState>,
    IdParam(user_id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    state.roles.promote_to_admin(user_id).await?;
    Ok(MessageResponse::new(MessageKey::PromotedToAdmin))
}
