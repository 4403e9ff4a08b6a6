//! Refresh token cookie.
//!
//! The refresh token travels only in an `HttpOnly` cookie so page script
//! never sees it.

use axum::http::header::{COOKIE, InvalidHeaderValue, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};

pub const REFRESH_COOKIE: &str = "refreshToken";

/// Deployment-wide cookie attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    /// Only send the cookie over HTTPS.
    pub secure: bool,
    /// Front end is served from another site; needs `SameSite=None`.
    pub cross_site: bool,
}

impl CookiePolicy {
    /// `Set-Cookie` value carrying `token` for `max_age` seconds.
    ///
    /// Cross-site delivery implies `Secure`, which browsers require with
    /// `SameSite=None`.
    pub fn refresh_cookie(&self, token: &str, max_age: u64) -> String {
        let mut cookie = format!("{REFRESH_COOKIE}={token}; Path=/; Max-Age={max_age}; HttpOnly");
        if self.secure || self.cross_site {
            cookie.push_str("; Secure");
        }
        cookie.push_str(if self.cross_site {
            "; SameSite=None"
        } else {
            "; SameSite=Lax"
        });
        cookie
    }

    /// Append the refresh cookie to a response.
    pub fn set_refresh(
        &self,
        headers: &mut HeaderMap,
        token: &str,
        max_age: u64,
    ) -> Result<(), InvalidHeaderValue> {
        headers.append(
            SET_COOKIE,
            HeaderValue::from_str(&self.refresh_cookie(token, max_age))?,
        );
        Ok(())
    }

    /// Append an expired refresh cookie so the browser drops it.
    pub fn clear_refresh(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        self.set_refresh(headers, "", 0)
    }
}

/// Value of the cookie named `name` from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}
