//! Domain models for the Guess Game auth service.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod notification;
