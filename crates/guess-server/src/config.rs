//! Server configuration read from the process environment.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use guess_auth::{AuthConfig, AuthError};
use guess_db::DbConfig;
use thiserror::Error;

use crate::cookie::CookiePolicy;
use crate::mailer::BrevoConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The assembled authentication settings are inconsistent as a whole.
    #[error("authentication settings are invalid: {0}")]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// The single browser origin allowed to call the API with credentials.
    pub cors_origin: HeaderValue,
    pub cookies: CookiePolicy,
    pub auth: AuthConfig,
    pub db: DbConfig,
    /// `None` when mail delivery is not configured.
    pub brevo: Option<BrevoConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr: SocketAddr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let cors_origin = HeaderValue::from_str(
            &get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        )
        .map_err(|e| ConfigError::Invalid {
            key: "CORS_ORIGIN",
            reason: e.to_string(),
        })?;

        let cookies = CookiePolicy {
            secure: parse_flag(get("SECURE_COOKIES"), "SECURE_COOKIES")?,
            cross_site: parse_flag(get("COOKIE_CROSS_SITE"), "COOKIE_CROSS_SITE")?,
        };

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            access_token_secret: get("JWT_ACCESS_SECRET")
                .ok_or(ConfigError::Missing("JWT_ACCESS_SECRET"))?,
            refresh_token_secret: get("JWT_REFRESH_SECRET")
                .ok_or(ConfigError::Missing("JWT_REFRESH_SECRET"))?,
            pepper: get("PASSWORD_PEPPER"),
            verification_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or(defaults.verification_base_url.clone()),
            ..defaults
        };
        auth.validate()?;

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: get("SURREAL_URL").unwrap_or(db_defaults.url),
            namespace: get("SURREAL_NS").unwrap_or(db_defaults.namespace),
            database: get("SURREAL_DB").unwrap_or(db_defaults.database),
            username: get("SURREAL_USER").unwrap_or(db_defaults.username),
            password: get("SURREAL_PASS").unwrap_or(db_defaults.password),
        };

        let brevo = match (get("BREVO_API_KEY"), get("BREVO_SENDER_EMAIL")) {
            (Some(api_key), Some(sender_email)) => Some(BrevoConfig {
                api_key,
                sender_email,
                sender_name: get("BREVO_SENDER_NAME"),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BREVO_SENDER_EMAIL")),
            (None, Some(_)) => return Err(ConfigError::Missing("BREVO_API_KEY")),
        };

        Ok(Self {
            bind_addr,
            cors_origin,
            cookies,
            auth,
            db,
            brevo,
        })
    }
}

fn parse_flag(value: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [
        ("JWT_ACCESS_SECRET", "access"),
        ("JWT_REFRESH_SECRET", "refresh"),
    ];

    #[test]
    fn defaults_with_only_secrets() {
        let config = ServerConfig::from_lookup(lookup(&SECRETS)).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert!(!config.cookies.secure);
        assert!(!config.cookies.cross_site);
        assert!(config.brevo.is_none());
        assert!(config.auth.pepper.is_none());
        assert_eq!(config.auth.access_token_lifetime_secs, 180);
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let err = ServerConfig::from_lookup(lookup(&[("JWT_ACCESS_SECRET", "a")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_REFRESH_SECRET")));
    }

    #[test]
    fn shared_secret_is_refused() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("JWT_ACCESS_SECRET", "same"),
            ("JWT_REFRESH_SECRET", "same"),
        ]))
        .unwrap_err();
        assert!(
            matches!(&err, ConfigError::Auth(AuthError::Config(reason)) if reason.contains("differ")),
            "got: {err:?}"
        );
        assert!(!err.to_string().contains("JWT_REFRESH_SECRET is invalid"));
    }

    #[test]
    fn full_environment() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CORS_ORIGIN", "https://guess.example.com"),
            ("SECURE_COOKIES", "true"),
            ("COOKIE_CROSS_SITE", "1"),
            ("PUBLIC_BASE_URL", "https://api.guess.example.com"),
            ("PASSWORD_PEPPER", "pepper"),
            ("SURREAL_URL", "mem://"),
            ("BREVO_API_KEY", "key"),
            ("BREVO_SENDER_EMAIL", "noreply@guess.example.com"),
        ]);

        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.cookies.secure && config.cookies.cross_site);
        assert_eq!(
            config.auth.verification_url("t"),
            "https://api.guess.example.com/verify/t"
        );
        assert_eq!(config.auth.pepper.as_deref(), Some("pepper"));
        assert_eq!(config.db.url, "mem://");
        let brevo = config.brevo.unwrap();
        assert_eq!(brevo.sender_email, "noreply@guess.example.com");
        assert!(brevo.sender_name.is_none());
    }

    #[test]
    fn half_configured_mail_is_an_error() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("BREVO_API_KEY", "key"));
        let err = ServerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BREVO_SENDER_EMAIL")));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("SECURE_COOKIES", "maybe"));
        assert!(ServerConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
