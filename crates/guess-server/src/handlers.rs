//! HTTP handlers.

use axum::{Extension, Json};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use guess_auth::{AuthenticatedAccount, LoginInput, SignUpInput};
use guess_core::error::GuessError;
use guess_core::models::account::AccountSummary;
use guess_core::notifier::Notifier;
use guess_core::repository::AccountRepository;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::cookie::{REFRESH_COOKIE, read_cookie};
use crate::error::ApiError;
use crate::state::AppState;

// Absent and `null` fields both read as empty so the service can answer
// with its own validation message.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResendRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: AccountSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: &'static str,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
}

/// POST /signUp
pub async fn sign_up<A: AccountRepository, N: Notifier>(
    State(state): State<AppState<A, N>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;

    state
        .auth
        .sign_up(SignUpInput {
            username: req.username.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Signup successful! Check your email to verify your account.",
        }),
    ))
}

/// POST /login
///
/// Access token in the `Authorization` header, refresh token in an
/// `HttpOnly` cookie, account summary in the body.
pub async fn login<A: AccountRepository, N: Notifier>(
    State(state): State<AppState<A, N>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let Json(req) = payload?;

    let out = state
        .auth
        .login(LoginInput {
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
        })
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer(&out.access_token)?);
    state
        .cookies
        .set_refresh(&mut headers, &out.refresh_token, out.refresh_expires_in)
        .map_err(ApiError::internal)?;

    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful",
            user: out.account,
        }),
    ))
}

/// GET /verify/:token
///
/// Answers in plain text: the link is opened straight from an email client.
pub async fn verify_email<A: AccountRepository, N: Notifier>(
    State(state): State<AppState<A, N>>,
    Path(token): Path<String>,
) -> Response {
    match state.auth.verify_email(&token).await {
        Ok(_) => (
            StatusCode::OK,
            "Email verified successfully! You can now log in.",
        )
            .into_response(),
        Err(GuessError::TokenInvalidOrExpired) => {
            (StatusCode::BAD_REQUEST, "Invalid or expired token").into_response()
        }
        Err(e) => {
            error!(error = %e, "Email verification failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// POST /verify/resend
pub async fn resend_verification<A: AccountRepository, N: Notifier>(
    State(state): State<AppState<A, N>>,
    payload: Result<Json<ResendRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;

    state
        .auth
        .resend_verification(req.email.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(MessageResponse {
        message: "If that account is awaiting verification, a new link has been sent.",
    }))
}

/// POST /auth/refresh
pub async fn refresh<A: AccountRepository, N: Notifier>(
    State(state): State<AppState<A, N>>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<RefreshResponse>), ApiError> {
    let out = state
        .auth
        .refresh(read_cookie(&headers, REFRESH_COOKIE))
        .map_err(ApiError::refresh)?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(AUTHORIZATION, bearer(&out.access_token)?);

    Ok((
        response_headers,
        Json(RefreshResponse {
            message: "Access token refreshed",
            access_token: out.access_token,
        }),
    ))
}

/// GET /auth/check
pub async fn check(Extension(account): Extension<AuthenticatedAccount>) -> Json<CheckResponse> {
    debug!(account_id = %account.id, "Session check");
    Json(CheckResponse {
        authenticated: true,
    })
}

/// GET /logout
///
/// Tokens are stateless, so this only tells the browser to drop the
/// refresh cookie.
pub async fn logout<A: AccountRepository, N: Notifier>(
    State(state): State<AppState<A, N>>,
) -> Result<(HeaderMap, Json<MessageResponse>), ApiError> {
    let mut headers = HeaderMap::new();
    state
        .cookies
        .clear_refresh(&mut headers)
        .map_err(ApiError::internal)?;

    Ok((
        headers,
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}

fn bearer(token: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!("Bearer {token}")).map_err(ApiError::internal)
}
