//! Outbound notification payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a [`Notifier`](crate::notifier::Notifier) needs to deliver a
/// verification link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationNotice {
    pub email: String,
    pub username: String,
    /// Raw verification token, embedded in `verify_url`.
    pub token: String,
    pub verify_url: String,
    pub expires_at: DateTime<Utc>,
    /// Length of the validity window, for wording in the message.
    pub valid_for_secs: u64,
}
