//! Shared application state.

use std::sync::Arc;

use guess_auth::AuthService;
use guess_core::notifier::Notifier;
use guess_core::repository::AccountRepository;

use crate::cookie::CookiePolicy;

/// Handed to every handler. Built once in `main` and cloned per request.
pub struct AppState<A: AccountRepository, N: Notifier> {
    pub auth: Arc<AuthService<A, N>>,
    pub cookies: CookiePolicy,
}

impl<A: AccountRepository, N: Notifier> AppState<A, N> {
    pub fn new(auth: AuthService<A, N>, cookies: CookiePolicy) -> Self {
        Self {
            auth: Arc::new(auth),
            cookies,
        }
    }
}

impl<A: AccountRepository, N: Notifier> Clone for AppState<A, N> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            cookies: self.cookies,
        }
    }
}
