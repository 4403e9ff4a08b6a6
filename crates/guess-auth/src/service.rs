//! Authentication service: signup, email verification, login and token
//! refresh orchestration.

use guess_core::error::{GuessError, GuessResult};
use guess_core::models::account::{AccountSummary, CreateAccount};
use guess_core::models::notification::VerificationNotice;
use guess_core::notifier::Notifier;
use guess_core::repository::AccountRepository;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::guard::AuthenticationGuard;
use crate::password::CredentialHasher;
use crate::token::{SessionTokenIssuer, TokenKind};
use crate::verification::{VerificationToken, VerificationTokenIssuer};

/// Input for the signup flow.
#[derive(Debug, Default)]
pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Successful signup result.
#[derive(Debug)]
pub struct SignUpOutput {
    pub account_id: Uuid,
    /// `false` when the account was created but the verification email
    /// could not be handed to the provider.
    pub notification_sent: bool,
}

/// Input for the login flow.
#[derive(Debug, Default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed access token (return in the `Authorization` header).
    pub access_token: String,
    /// Signed refresh token (return as an HTTP-only cookie).
    pub refresh_token: String,
    pub account: AccountSummary,
    /// Refresh token lifetime in seconds, used as the cookie max-age.
    pub refresh_expires_in: u64,
}

/// Successful refresh result.
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
}

/// Authentication service.
///
/// Generic over the account directory and notifier so that the auth layer
/// has no dependency on the database crate or on a mail provider.
pub struct AuthService<A: AccountRepository, N: Notifier> {
    accounts: A,
    notifier: N,
    hasher: CredentialHasher,
    verification: VerificationTokenIssuer,
    tokens: SessionTokenIssuer,
    guard: AuthenticationGuard,
    config: AuthConfig,
}

impl<A: AccountRepository, N: Notifier> AuthService<A, N> {
    pub fn new(accounts: A, notifier: N, config: AuthConfig) -> Result<Self, AuthError> {
        let tokens = SessionTokenIssuer::new(&config)?;
        Ok(Self {
            accounts,
            notifier,
            hasher: CredentialHasher::new(&config)?,
            verification: VerificationTokenIssuer::new(&config),
            guard: AuthenticationGuard::new(tokens.clone()),
            tokens,
            config,
        })
    }

    pub fn tokens(&self) -> &SessionTokenIssuer {
        &self.tokens
    }

    pub fn guard(&self) -> &AuthenticationGuard {
        &self.guard
    }

    /// Register a new, unverified account and mail its verification link.
    pub async fn sign_up(&self, input: SignUpInput) -> GuessResult<SignUpOutput> {
        // 1. All three fields are mandatory.
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(GuessError::validation("All fields required"));
        }

        // 2. Reject taken emails up front; the unique index catches races.
        match self.accounts.get_by_email(email).await {
            Ok(_) => return Err(email_taken()),
            Err(GuessError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // 3. Hash off the request executor.
        let password_hash = self.hasher.hash(&input.password).await?;

        // 4. Persist together with a fresh verification token.
        let token = self.verification.issue();
        let account = self
            .accounts
            .create(CreateAccount {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                verification_token: token.value.clone(),
                verification_token_expires: token.expires_at,
            })
            .await
            .map_err(|e| match e {
                GuessError::AlreadyExists { .. } => email_taken(),
                other => other,
            })?;

        info!(account_id = %account.id, "Account registered");

        // 5. Best effort: the account already exists, and a lost email can
        //    be recovered through `resend_verification`.
        let notification_sent = self
            .dispatch(account.id, &account.username, &account.email, token)
            .await;

        Ok(SignUpOutput {
            account_id: account.id,
            notification_sent,
        })
    }

    /// Consume a verification token and return the verified account.
    pub async fn verify_email(&self, token: &str) -> GuessResult<AccountSummary> {
        let account = self
            .verification
            .validate_and_consume(&self.accounts, token)
            .await?;

        info!(account_id = %account.id, "Email verified");
        Ok(account.summary())
    }

    /// Issue and mail a new verification token for a pending account.
    ///
    /// Unknown and already-verified emails are silently ignored so the
    /// outcome cannot be used to discover registered addresses.
    pub async fn resend_verification(&self, email: &str) -> GuessResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(GuessError::validation("Email required"));
        }

        let account = match self.accounts.get_by_email(email).await {
            Ok(account) => account,
            Err(GuessError::NotFound { .. }) => {
                debug!("Verification resend for unknown email ignored");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if account.is_verified {
            debug!(account_id = %account.id, "Verification resend for verified account ignored");
            return Ok(());
        }

        let token = self.verification.issue();
        match self
            .accounts
            .replace_verification_token(account.id, token.value.clone(), token.expires_at)
            .await
        {
            Ok(_) => {}
            // Verified between the lookup and the update.
            Err(GuessError::NotFound { .. }) => return Ok(()),
            Err(e) => return Err(e),
        }

        self.dispatch(account.id, &account.username, &account.email, token)
            .await;
        Ok(())
    }

    /// Authenticate with email + password and issue both tokens.
    pub async fn login(&self, input: LoginInput) -> GuessResult<LoginOutput> {
        // 1. Both fields are mandatory.
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(GuessError::validation("Email & password required"));
        }

        // 2. Look up the account; an unknown email looks like a bad password.
        let account = match self.accounts.get_by_email(email).await {
            Ok(account) => account,
            Err(GuessError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        // 3. Only verified accounts may log in.
        if !account.is_verified {
            debug!(account_id = %account.id, "Login before email verification");
            return Err(AuthError::AccountPendingVerification.into());
        }

        // 4. Verify password.
        if !self
            .hasher
            .verify(&input.password, &account.password_hash)
            .await?
        {
            debug!(account_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 5. Mint both tokens.
        let access_token = self.tokens.issue_access(account.id)?;
        let refresh_token = self.tokens.issue_refresh(account.id)?;

        info!(account_id = %account.id, "Login succeeded");

        Ok(LoginOutput {
            access_token,
            refresh_token,
            account: account.summary(),
            refresh_expires_in: self.tokens.lifetime_secs(TokenKind::Refresh) as u64,
        })
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The refresh token is not rotated; it stays valid until it expires.
    pub fn refresh(&self, refresh_token: Option<&str>) -> GuessResult<RefreshOutput> {
        let raw = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let account_id = self.tokens.validate_refresh(raw).inspect_err(|e| {
            debug!(error = %e, "Refresh token rejected");
        })?;

        let access_token = self.tokens.issue_access(account_id)?;
        debug!(account_id = %account_id, "Access token refreshed");

        Ok(RefreshOutput { access_token })
    }

    async fn dispatch(
        &self,
        account_id: Uuid,
        username: &str,
        email: &str,
        token: VerificationToken,
    ) -> bool {
        let notice = VerificationNotice {
            email: email.to_string(),
            username: username.to_string(),
            verify_url: self.config.verification_url(&token.value),
            token: token.value,
            expires_at: token.expires_at,
            valid_for_secs: self.config.verification_token_lifetime_secs,
        };

        match self.notifier.send_verification(notice).await {
            Ok(()) => true,
            Err(e) => {
                warn!(account_id = %account_id, error = %e, "Verification email not delivered");
                false
            }
        }
    }
}

fn email_taken() -> GuessError {
    GuessError::AlreadyExists {
        entity: "email".into(),
    }
}
