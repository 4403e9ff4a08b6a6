//! Guess DB — SurrealDB connection management and the account
//! directory used by the auth core.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema migrations ([`run_migrations`])
//! - [`SurrealAccountRepository`], the [`AccountRepository`] implementation
//!
//! [`AccountRepository`]: guess_core::repository::AccountRepository

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::SurrealAccountRepository;
pub use schema::{latest_version, run_migrations};
