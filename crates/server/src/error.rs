//! API error type and HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`. Client errors surface their
//! message in the JSON body; server errors are logged, reported to Sentry,
//! and returned with a generic message so internals never leak.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Top-level error for request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and client-facing message for this error.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            Self::Database(_) | Self::Internal(_) => internal(),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_owned()),
                AuthError::UserAlreadyExists => {
                    (StatusCode::BAD_REQUEST, "Email already exists".to_owned())
                }
                AuthError::Repository(_) | AuthError::PasswordHash => internal(),
            },
            Self::Order(err) => match err {
                OrderError::MissingField => {
                    (StatusCode::BAD_REQUEST, "All fields are required".to_owned())
                }
                OrderError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "User not found".to_owned())
                }
                OrderError::ProductNotFound => {
                    (StatusCode::NOT_FOUND, "Product not found".to_owned())
                }
                OrderError::OrderNotFound => {
                    (StatusCode::NOT_FOUND, "Order not found".to_owned())
                }
                OrderError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "Insufficient permissions".to_owned(),
                ),
                OrderError::Repository(_) => internal(),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_owned(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            sentry::capture_error(&self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
