use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::messages::MessageKey;

/// Single `{id}` path segment parsed as a UUID.
#[derive(Debug, Clone, Copy)]
pub struct IdParam(pub Uuid);

impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Invalid(MessageKey::UserInvalidId))?;
        Uuid::parse_str(&raw)
            .map(IdParam)
            .map_err(|_| AppError::Invalid(MessageKey::UserInvalidId))
    }
}

/// `Json` with rejections rendered in the service's error format.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!(error = %rejection, "rejected request body");
                Err(AppError::Invalid(MessageKey::InvalidPayload))
            }
        }
    }
}
