//! Guess Server — HTTP front end for account signup, email verification,
//! login and session tokens.

pub mod config;
pub mod cookie;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod state;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use guess_core::notifier::Notifier;
use guess_core::repository::AccountRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use mailer::{BrevoMailer, LogMailer, Mailer};
pub use state::AppState;

/// Build the application router.
///
/// `cors_origin` is the one browser origin allowed to send credentials;
/// the `Authorization` response header is exposed to it.
pub fn router<A, N>(state: AppState<A, N>, cors_origin: HeaderValue) -> Router
where
    A: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([AUTHORIZATION])
        .allow_credentials(true);

    let protected = Router::new()
        .route("/auth/check", get(handlers::check))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth::<A, N>,
        ));

    Router::new()
        .route("/signUp", post(handlers::sign_up::<A, N>))
        .route("/login", post(handlers::login::<A, N>))
        .route("/logout", get(handlers::logout::<A, N>))
        .route("/verify/resend", post(handlers::resend_verification::<A, N>))
        .route("/verify/:token", get(handlers::verify_email::<A, N>))
        .route("/auth/refresh", post(handlers::refresh::<A, N>))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
