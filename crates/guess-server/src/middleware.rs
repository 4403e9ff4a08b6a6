//! Access token guard for protected routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use guess_auth::AuthError;
use guess_core::notifier::Notifier;
use guess_core::repository::AccountRepository;

use crate::error::ApiError;
use crate::state::AppState;

/// Reject the request unless it carries a valid access token, and hand the
/// resolved [`AuthenticatedAccount`](guess_auth::AuthenticatedAccount) to
/// the handler through request extensions.
pub async fn require_auth<A, N>(
    State(state): State<AppState<A, N>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    A: AccountRepository + 'static,
    N: Notifier + 'static,
{
    // A header that is present but not visible ASCII was still presented,
    // so it is refused as invalid rather than missing.
    let header = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| {
            AuthError::TokenInvalid("unreadable Authorization header".into())
        })?),
    };

    let account = state.auth.guard().authenticate(header)?;

    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}
