//! Single-use, time-boxed email verification tokens.
//!
//! A token is not an entity of its own: it lives as a pair of fields on the
//! pending account and is consumed by one conditional update in the
//! directory.

use chrono::{DateTime, Duration, Utc};
use guess_core::error::{GuessError, GuessResult};
use guess_core::models::account::Account;
use guess_core::repository::AccountRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Raw token bytes (256 bits).
const TOKEN_BYTES: usize = 32;

/// Freshly minted verification token and its absolute expiry.
#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VerificationTokenIssuer {
    lifetime: Duration,
}

impl VerificationTokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            lifetime: Duration::seconds(config.verification_token_lifetime_secs as i64),
        }
    }

    /// Generate a random hex token valid for the configured window.
    pub fn issue(&self) -> VerificationToken {
        let mut rng = rand::rng();
        let bytes: [u8; TOKEN_BYTES] = rand::Rng::random(&mut rng);
        VerificationToken {
            value: hex::encode(bytes),
            expires_at: Utc::now() + self.lifetime,
        }
    }

    /// Consume `presented` and return the now-verified account.
    ///
    /// Wrong, expired, already-used and empty tokens all fail the same way.
    pub async fn validate_and_consume<A: AccountRepository>(
        &self,
        accounts: &A,
        presented: &str,
    ) -> GuessResult<Account> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AuthError::TokenInvalid("empty verification token".into()).into());
        }

        match accounts.consume_verification_token(presented).await {
            Ok(account) => Ok(account),
            Err(GuessError::NotFound { .. }) => {
                Err(AuthError::TokenInvalid("no pending verification matched".into()).into())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> VerificationTokenIssuer {
        VerificationTokenIssuer::new(&AuthConfig::default())
    }

    #[test]
    fn token_is_hex_encoded_256_bits() {
        let token = issuer().issue();
        assert_eq!(token.value.len(), TOKEN_BYTES * 2);
        assert!(token.value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        let issuer = issuer();
        assert_ne!(issuer.issue().value, issuer.issue().value);
    }

    #[test]
    fn expiry_is_fifteen_minutes_ahead() {
        let before = Utc::now();
        let token = issuer().issue();
        let after = Utc::now();
        assert!(before + Duration::minutes(15) <= token.expires_at);
        assert!(token.expires_at <= after + Duration::minutes(15));
    }
}
