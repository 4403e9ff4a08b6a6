//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guess_auth::AuthError;
use guess_core::error::GuessError;
use serde_json::json;
use thiserror::Error;

const SERVER_ERROR: &str = "Server error";

/// Error returned by every handler, rendered as `{"message": ...}`.
///
/// Server-side failures are logged with their detail at construction and
/// reach the client only as a generic message.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
    }

    /// Same mapping as `From<GuessError>`, worded for the refresh cookie.
    pub fn refresh(err: GuessError) -> Self {
        match err {
            GuessError::TokenMissing => Self::new(StatusCode::UNAUTHORIZED, "No refresh token"),
            GuessError::TokenInvalidOrExpired => {
                Self::new(StatusCode::FORBIDDEN, "Invalid or expired refresh token")
            }
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<GuessError> for ApiError {
    fn from(err: GuessError) -> Self {
        if err.is_server_failure() {
            return Self::internal(&err);
        }

        match err {
            GuessError::Validation { message } => Self::new(StatusCode::BAD_REQUEST, message),
            GuessError::AlreadyExists { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Email already registered")
            }
            GuessError::CredentialsRejected => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid credentials")
            }
            GuessError::UnverifiedAccount => {
                Self::new(StatusCode::FORBIDDEN, "Please verify your email first")
            }
            GuessError::TokenMissing => Self::new(StatusCode::UNAUTHORIZED, "No token provided"),
            GuessError::TokenInvalidOrExpired => {
                Self::new(StatusCode::FORBIDDEN, "Invalid or expired token")
            }
            GuessError::NotFound { entity, .. } => {
                Self::new(StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            other => Self::internal(&other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        GuessError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Malformed request body");
        Self::new(StatusCode::BAD_REQUEST, "Invalid request body")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}
