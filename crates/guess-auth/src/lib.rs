//! Guess Auth — password hashing, email verification tokens, and
//! access/refresh session tokens.

pub mod config;
pub mod error;
pub mod guard;
pub mod password;
pub mod service;
pub mod token;
pub mod verification;

pub use config::AuthConfig;
pub use error::AuthError;
pub use guard::{AuthenticatedAccount, AuthenticationGuard};
pub use password::CredentialHasher;
pub use service::{
    AuthService, LoginInput, LoginOutput, RefreshOutput, SignUpInput, SignUpOutput,
};
pub use token::{SessionTokenIssuer, TokenKind};
pub use verification::{VerificationToken, VerificationTokenIssuer};
