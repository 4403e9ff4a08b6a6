//! Authentication error types.

use guess_core::error::GuessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is pending verification")]
    AccountPendingVerification,

    #[error("no token provided")]
    TokenMissing,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for GuessError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => GuessError::CredentialsRejected,
            AuthError::AccountPendingVerification => GuessError::UnverifiedAccount,
            AuthError::TokenMissing => GuessError::TokenMissing,
            // Callers never learn why a token was refused.
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                GuessError::TokenInvalidOrExpired
            }
            AuthError::Config(msg) => GuessError::Internal(msg),
            AuthError::Crypto(msg) => GuessError::Crypto(msg),
        }
    }
}
