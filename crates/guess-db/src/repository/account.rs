//! SurrealDB implementation of [`AccountRepository`].
//!
//! Password hashing happens upstream; this repository only ever sees the
//! PHC string. Email uniqueness is enforced by `idx_account_email`.

use chrono::{DateTime, Utc};
use guess_core::error::GuessResult;
use guess_core::models::account::{Account, CreateAccount};
use guess_core::repository::AccountRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

const ENTITY: &str = "account";

#[derive(Debug, SurrealValue)]
struct AccountRow {
    account_id: String,
    username: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    verification_token: Option<String>,
    verification_token_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.account_id)
            .map_err(|e| DbError::Decode(format!("invalid account UUID: {e}")))?;
        Ok(Account {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            is_verified: self.is_verified,
            verification_token: self.verification_token,
            verification_token_expires: self.verification_token_expires,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn first_account(rows: Vec<AccountRow>, id: impl Into<String>) -> Result<Account, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id.into(),
        })?
        .try_into_account()
}

/// Attempts per write statement before a write conflict is surfaced.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Re-run a write statement that lost an optimistic-commit race.
///
/// The winner has committed by the time a conflict is reported, so the next
/// attempt sees its effects: a consumed token no longer matches and a taken
/// email trips the unique index.
async fn retry_on_conflict<T, F, Fut>(mut op: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                debug!(attempt, error = %err, "Write conflict, retrying statement");
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// SurrealDB implementation of the account directory.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn create_once(&self, id: &str, input: &CreateAccount) -> Result<Account, DbError> {
        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 account_id = $id, \
                 username = $username, \
                 email = $email, \
                 password_hash = $password_hash, \
                 is_verified = false, \
                 verification_token = $verification_token, \
                 verification_token_expires = $verification_token_expires",
            )
            .bind(("id", id.to_string()))
            .bind(("username", input.username.clone()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", input.password_hash.clone()))
            .bind(("verification_token", input.verification_token.clone()))
            .bind(("verification_token_expires", input.verification_token_expires))
            .await
            .map_err(DbError::from_query)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, "email"))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        first_account(rows, id)
    }

    async fn consume_once(&self, token: &str) -> Result<Account, DbError> {
        // One statement: the match, the flag flip and the clearing of both
        // token fields commit together, so a second caller finds nothing.
        // `$token` is reserved by SurrealDB, hence the longer name.
        let result = self
            .db
            .query(
                "UPDATE account SET \
                 is_verified = true, \
                 verification_token = NONE, \
                 verification_token_expires = NONE, \
                 updated_at = time::now() \
                 WHERE verification_token = $verification_token \
                 AND verification_token_expires > time::now()",
            )
            .bind(("verification_token", token.to_string()))
            .await
            .map_err(DbError::from_query)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, ENTITY))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        first_account(rows, "verification_token")
    }

    async fn replace_once(
        &self,
        id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Account, DbError> {
        let result = self
            .db
            .query(
                "UPDATE type::record('account', $id) SET \
                 verification_token = $new_token, \
                 verification_token_expires = $expires_at, \
                 updated_at = time::now() \
                 WHERE is_verified = false",
            )
            .bind(("id", id.to_string()))
            .bind(("new_token", token.to_string()))
            .bind(("expires_at", expires_at))
            .await
            .map_err(DbError::from_query)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, ENTITY))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        first_account(rows, id)
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> GuessResult<Account> {
        let id = Uuid::new_v4().to_string();
        let account = retry_on_conflict(|| self.create_once(&id, &input)).await?;

        debug!(account_id = %account.id, "Account created");
        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> GuessResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_account(rows, id_str)?)
    }

    async fn get_by_email(&self, email: &str) -> GuessResult<Account> {
        let mut result = self
            .db
            .query("SELECT * FROM account WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_account(rows, format!("email={email}"))?)
    }

    async fn consume_verification_token(&self, token: &str) -> GuessResult<Account> {
        Ok(retry_on_conflict(|| self.consume_once(token)).await?)
    }

    async fn replace_verification_token(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> GuessResult<Account> {
        let id = id.to_string();
        Ok(retry_on_conflict(|| self.replace_once(&id, &token, expires_at)).await?)
    }
}
