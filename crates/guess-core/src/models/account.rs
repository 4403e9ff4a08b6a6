//! Account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string. Never the raw password.
    pub password_hash: String,
    pub is_verified: bool,
    /// Pending email-verification token; `None` once consumed.
    pub verification_token: Option<String>,
    pub verification_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Public view of the account, safe to return to clients.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// The fields of an [`Account`] that may leave the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    /// Already-hashed password.
    pub password_hash: String,
    pub verification_token: String,
    pub verification_token_expires: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_secrets() {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            is_verified: true,
            verification_token: None,
            verification_token_expires: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&account.summary()).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }
}
