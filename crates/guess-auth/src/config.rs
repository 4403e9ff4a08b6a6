//! Authentication configuration.

use crate::error::AuthError;

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. Must differ from the refresh secret.
    pub access_token_secret: String,
    /// HMAC secret for refresh tokens.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 180 = 3 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// Email verification window in seconds (default: 900 = 15 minutes).
    pub verification_token_lifetime_secs: u64,
    /// Public origin used to build verification links,
    /// e.g. `https://guess.example.com`.
    pub verification_base_url: String,
    /// Optional pepper prepended to passwords before Argon2id.
    pub pepper: Option<String>,
    /// Argon2id memory cost in KiB (default: 19_456 = 19 MiB).
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub argon2_iterations: u32,
    /// Argon2id lanes (default: 1).
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 180,
            refresh_token_lifetime_secs: 604_800,
            verification_token_lifetime_secs: 900,
            verification_base_url: "http://localhost:5000".into(),
            pepper: None,
            argon2_memory_kib: 19_456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl AuthConfig {
    /// Reject configurations that would let one token kind stand in for
    /// the other.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AuthError::Config(
                "access and refresh token secrets must be set".into(),
            ));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AuthError::Config(
                "access and refresh token secrets must differ".into(),
            ));
        }
        if self.access_token_lifetime_secs == 0 || self.refresh_token_lifetime_secs == 0 {
            return Err(AuthError::Config("token lifetimes must be positive".into()));
        }
        Ok(())
    }

    /// Link mailed to the user for the given verification token.
    pub fn verification_url(&self, token: &str) -> String {
        format!(
            "{}/verify/{token}",
            self.verification_base_url.trim_end_matches('/')
        )
    }
}
