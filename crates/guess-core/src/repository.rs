//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The account directory is the only
//! persistent collaborator of the auth core.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GuessResult;
use crate::models::account::{Account, CreateAccount};

pub trait AccountRepository: Send + Sync {
    /// Insert a new, unverified account.
    ///
    /// Fails with `AlreadyExists` when the email is taken, including when a
    /// concurrent insert wins the race on the unique index.
    fn create(&self, input: CreateAccount) -> impl Future<Output = GuessResult<Account>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GuessResult<Account>> + Send;

    fn get_by_email(&self, email: &str) -> impl Future<Output = GuessResult<Account>> + Send;

    /// Atomically find the account whose pending token equals `token` and
    /// whose expiry is strictly in the future, mark it verified and clear
    /// both token fields in the same update.
    ///
    /// Returns `NotFound` when nothing matched (wrong, expired or already
    /// consumed token). At most one concurrent caller can succeed for a
    /// given token.
    fn consume_verification_token(
        &self,
        token: &str,
    ) -> impl Future<Output = GuessResult<Account>> + Send;

    /// Replace the pending verification token of an unverified account.
    ///
    /// Returns `NotFound` if the account does not exist or is already
    /// verified.
    fn replace_verification_token(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = GuessResult<Account>> + Send;
}
