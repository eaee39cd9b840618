use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;
use tracing::error;

use crate::messages::{translate, MessageKey};

/// Failures surfaced to API callers.
///
/// Domain failures are raised explicitly and travel unchanged to the
/// response boundary. Anything unexpected goes through [`AppError::internal`],
/// which logs the detail and keeps it out of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(MessageKey),
    #[error("forbidden: {0}")]
    Forbidden(MessageKey),
    #[error("not found: {0}")]
    NotFound(MessageKey),
    #[error("conflict: {0}")]
    Conflict(MessageKey),
    #[error("invalid request: {0}")]
    Invalid(MessageKey),
    #[error("internal error: {0}")]
    Internal(MessageKey),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl AppError {
    /// Log an unexpected collaborator failure and collapse it into a generic
    /// `Internal` error carrying only `key`.
    pub fn internal(key: MessageKey, err: impl Display) -> Self {
        error!(key = key.as_str(), error = %err, "unexpected failure");
        AppError::Internal(key)
    }

    pub fn key(&self) -> MessageKey {
        match *self {
            AppError::Unauthenticated(k)
            | AppError::Forbidden(k)
            | AppError::NotFound(k)
            | AppError::Conflict(k)
            | AppError::Invalid(k)
            | AppError::Internal(k) => k,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Invalid(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let key = self.key();
        (
            self.status(),
            Json(ErrorResponse {
                error: translate(key).to_string(),
                code: key.as_str(),
            }),
        )
            .into_response()
    }
}
