//! Out-of-band delivery of verification links.

use crate::error::GuessResult;
use crate::models::notification::VerificationNotice;

pub trait Notifier: Send + Sync {
    /// Deliver a verification link to the account's email address.
    fn send_verification(
        &self,
        notice: VerificationNotice,
    ) -> impl Future<Output = GuessResult<()>> + Send;
}
