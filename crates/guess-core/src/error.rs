//! Error types for the Guess Game auth service.
//!
//! Every boundary operation returns [`GuessResult`]. Component crates keep
//! their own error enums and convert into [`GuessError`] at the seam.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuessError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Unknown email or wrong password. The two cases are never told apart.
    #[error("Invalid credentials")]
    CredentialsRejected,

    #[error("Account email is not verified")]
    UnverifiedAccount,

    /// No credential was supplied at all.
    #[error("No token provided")]
    TokenMissing,

    /// A credential was supplied but rejected (bad signature, expired,
    /// wrong kind, or already consumed).
    #[error("Invalid or expired token")]
    TokenInvalidOrExpired,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuessError {
    /// Shorthand for a [`GuessError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// `true` for faults the caller cannot fix (storage, crypto,
    /// infrastructure). These surface as a generic server error.
    pub fn is_server_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Crypto(_) | Self::Notification(_) | Self::Internal(_)
        )
    }
}

pub type GuessResult<T> = Result<T, GuessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_failures_are_classified() {
        assert!(GuessError::Database("down".into()).is_server_failure());
        assert!(GuessError::Crypto("bad hash".into()).is_server_failure());
        assert!(GuessError::Notification("smtp".into()).is_server_failure());
        assert!(GuessError::Internal("join".into()).is_server_failure());
    }

    #[test]
    fn caller_errors_are_not_server_failures() {
        assert!(!GuessError::CredentialsRejected.is_server_failure());
        assert!(!GuessError::UnverifiedAccount.is_server_failure());
        assert!(!GuessError::TokenMissing.is_server_failure());
        assert!(!GuessError::TokenInvalidOrExpired.is_server_failure());
        assert!(!GuessError::validation("missing email").is_server_failure());
    }
}
