//! HS256 access and refresh token issuance/verification.
//!
//! Each kind is signed with its own secret, so a token of one kind fails
//! signature verification when presented as the other. Nothing is
//! persisted: validity is signature plus embedded expiry.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: account ID (UUID string).
    pub sub: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Clone)]
struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl KindKeys {
    fn new(secret: &str, lifetime_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs: lifetime_secs as i64,
        }
    }
}

/// Mints and validates access/refresh tokens.
#[derive(Clone)]
pub struct SessionTokenIssuer {
    access: KindKeys,
    refresh: KindKeys,
    validation: Validation,
}

impl std::fmt::Debug for SessionTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenIssuer")
            .field("access_lifetime_secs", &self.access.lifetime_secs)
            .field("refresh_lifetime_secs", &self.refresh.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl SessionTokenIssuer {
    /// Build an issuer from validated configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            access: KindKeys::new(
                &config.access_token_secret,
                config.access_token_lifetime_secs,
            ),
            refresh: KindKeys::new(
                &config.refresh_token_secret,
                config.refresh_token_lifetime_secs,
            ),
            validation,
        })
    }

    fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of the given kind, in seconds.
    pub fn lifetime_secs(&self, kind: TokenKind) -> i64 {
        self.keys(kind).lifetime_secs
    }

    /// Sign a token of `kind` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        kind: TokenKind,
        account_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let keys = self.keys(kind);
        let iat = issued_at.timestamp();
        let claims = SessionClaims {
            sub: account_id.to_string(),
            iat,
            exp: iat + keys.lifetime_secs,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    pub fn issue_access(&self, account_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(TokenKind::Access, account_id, Utc::now())
    }

    pub fn issue_refresh(&self, account_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(TokenKind::Refresh, account_id, Utc::now())
    }

    /// Verify signature and expiry for `kind` and return the decoded claims.
    pub fn decode(&self, kind: TokenKind, token: &str) -> Result<SessionClaims, AuthError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }

    fn validate(&self, kind: TokenKind, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode(kind, token)?;
        Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("subject is not an account id: {e}")))
    }

    /// Account ID carried by a valid access token.
    pub fn validate_access(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate(TokenKind::Access, token)
    }

    /// Account ID carried by a valid refresh token.
    pub fn validate_refresh(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate(TokenKind::Refresh, token)
    }
}
