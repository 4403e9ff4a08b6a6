//! Password hashing and verification using Argon2id.
//!
//! The async entry points run the hashing on tokio's blocking pool.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Salted, peppered Argon2id hasher.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    pepper: Option<String>,
}

impl CredentialHasher {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("argon2 params: {e}")))?;

        Ok(Self {
            params,
            pepper: config.pepper.clone(),
        })
    }

    fn peppered(&self, password: &str) -> Vec<u8> {
        match &self.pepper {
            Some(p) => format!("{p}{password}").into_bytes(),
            None => password.as_bytes().to_vec(),
        }
    }

    /// Hash a password into a PHC string. Runs on the calling thread.
    pub fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let salt = SaltString::generate(&mut OsRng);

        argon2
            .hash_password(&self.peppered(password), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Crypto(format!("password hash: {e}")))
    }

    /// Verify a password against a PHC string. Runs on the calling thread.
    ///
    /// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
    /// `Err(AuthError::Crypto)` if the stored hash is malformed.
    pub fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

        // Cost parameters come from the PHC string, not from `self.params`.
        match Argon2::default().verify_password(&self.peppered(password), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| AuthError::Crypto(format!("hash task: {e}")))?
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &hash))
            .await
            .map_err(|e| AuthError::Crypto(format!("verify task: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so the test suite stays fast.
    fn hasher(pepper: Option<&str>) -> CredentialHasher {
        CredentialHasher::new(&AuthConfig {
            pepper: pepper.map(Into::into),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn correct_password_matches() {
        let h = hasher(None);
        let hash = h.hash_blocking("hunter2").unwrap();
        assert!(h.verify_blocking("hunter2", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let h = hasher(None);
        let hash = h.hash_blocking("hunter2").unwrap();
        assert!(!h.verify_blocking("wrong", &hash).unwrap());
    }

    #[test]
    fn hash_is_argon2id_and_salted() {
        let h = hasher(None);
        let a = h.hash_blocking("same-password").unwrap();
        let b = h.hash_blocking("same-password").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(!a.contains("same-password"));
    }

    #[test]
    fn pepper_is_applied() {
        let peppered = hasher(Some("pepper!"));
        let hash = peppered.hash_blocking("hunter2").unwrap();
        assert!(peppered.verify_blocking("hunter2", &hash).unwrap());
        // Without pepper should fail.
        assert!(!hasher(None).verify_blocking("hunter2", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = hasher(None).verify_blocking("pw", "not-a-hash");
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }

    #[test]
    fn invalid_params_are_a_config_error() {
        let result = CredentialHasher::new(&AuthConfig {
            argon2_parallelism: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn async_hash_and_verify() {
        let h = hasher(None);
        let hash = h.hash("correct-horse").await.unwrap();
        assert!(h.verify("correct-horse", &hash).await.unwrap());
        assert!(!h.verify("battery-staple", &hash).await.unwrap());
    }
}
