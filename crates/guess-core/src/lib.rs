//! Guess Core — shared domain models, error taxonomy, and the traits
//! through which the auth core reaches its external collaborators.

pub mod error;
pub mod models;
pub mod notifier;
pub mod repository;

pub use error::{GuessError, GuessResult};
