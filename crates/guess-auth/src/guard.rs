//! Request authentication gate, independent of any HTTP framework.
//!
//! The transport layer hands over the raw `Authorization` header value;
//! the guard answers with the authenticated account or with one of two
//! distinct refusals: nothing was presented, or what was presented is no
//! good.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;
use crate::token::SessionTokenIssuer;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity resolved from a valid access token.
///
/// Account state is not re-read: a token stays usable until it expires
/// even if the account changes in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthenticatedAccount {
    pub id: Uuid,
}

/// Pull the token out of an `Authorization: Bearer <token>` value.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Debug, Clone)]
pub struct AuthenticationGuard {
    tokens: SessionTokenIssuer,
}

impl AuthenticationGuard {
    pub fn new(tokens: SessionTokenIssuer) -> Self {
        Self { tokens }
    }

    /// Authenticate a request from its `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedAccount, AuthError> {
        let token = extract_bearer(header).ok_or(AuthError::TokenMissing)?;

        let id = self.tokens.validate_access(token).inspect_err(|e| {
            debug!(error = %e, "Access token rejected");
        })?;

        Ok(AuthenticatedAccount { id })
    }
}
