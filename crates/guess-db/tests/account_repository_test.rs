//! Integration tests for the account repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use guess_core::error::GuessError;
use guess_core::models::account::CreateAccount;
use guess_core::repository::AccountRepository;
use guess_db::SurrealAccountRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> SurrealAccountRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    guess_db::run_migrations(&db).await.unwrap();
    SurrealAccountRepository::new(db)
}

fn new_account(email: &str, token: &str, expires_in: Duration) -> CreateAccount {
    CreateAccount {
        username: "alice".into(),
        email: email.into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".into(),
        verification_token: token.into(),
        verification_token_expires: Utc::now() + expires_in,
    }
}

#[tokio::test]
async fn create_and_get_account() {
    let repo = setup().await;

    let account = repo
        .create(new_account("alice@example.com", "tok-1", Duration::minutes(15)))
        .await
        .unwrap();

    assert_eq!(account.username, "alice");
    assert_eq!(account.email, "alice@example.com");
    assert!(!account.is_verified);
    assert_eq!(account.verification_token.as_deref(), Some("tok-1"));
    assert!(account.verification_token_expires.is_some());

    let by_id = repo.get_by_id(account.id).await.unwrap();
    assert_eq!(by_id.id, account.id);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, account.id);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let repo = setup().await;

    let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, GuessError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let repo = setup().await;

    repo.create(new_account("dup@example.com", "tok-a", Duration::minutes(15)))
        .await
        .unwrap();

    let err = repo
        .create(new_account("dup@example.com", "tok-b", Duration::minutes(15)))
        .await
        .unwrap_err();

    assert!(
        matches!(err, GuessError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn consume_marks_verified_and_clears_token() {
    let repo = setup().await;
    let created = repo
        .create(new_account("bob@example.com", "tok-bob", Duration::minutes(15)))
        .await
        .unwrap();

    let verified = repo.consume_verification_token("tok-bob").await.unwrap();

    assert_eq!(verified.id, created.id);
    assert!(verified.is_verified);
    assert!(verified.verification_token.is_none());
    assert!(verified.verification_token_expires.is_none());

    let stored = repo.get_by_id(created.id).await.unwrap();
    assert!(stored.is_verified);
}

#[tokio::test]
async fn consume_is_single_use() {
    let repo = setup().await;
    repo.create(new_account("carol@example.com", "tok-carol", Duration::minutes(15)))
        .await
        .unwrap();

    repo.consume_verification_token("tok-carol").await.unwrap();

    let err = repo
        .consume_verification_token("tok-carol")
        .await
        .unwrap_err();
    assert!(matches!(err, GuessError::NotFound { .. }));
}

#[tokio::test]
async fn expired_token_does_not_match() {
    let repo = setup().await;
    let created = repo
        .create(new_account("dave@example.com", "tok-dave", -Duration::seconds(1)))
        .await
        .unwrap();

    let err = repo
        .consume_verification_token("tok-dave")
        .await
        .unwrap_err();
    assert!(matches!(err, GuessError::NotFound { .. }));

    let stored = repo.get_by_id(created.id).await.unwrap();
    assert!(!stored.is_verified);
}

#[tokio::test]
async fn concurrent_consumers_at_most_one_wins() {
    let repo = setup().await;
    repo.create(new_account("erin@example.com", "tok-erin", Duration::minutes(15)))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        repo.consume_verification_token("tok-erin"),
        repo.consume_verification_token("tok-erin"),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_consumers_on_many_threads_lose_with_not_found() {
    let repo = setup().await;
    let created = repo
        .create(new_account("ezra@example.com", "tok-ezra", Duration::minutes(15)))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.consume_verification_token("tok-ezra").await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(account) => {
                assert_eq!(account.id, created.id);
                winners += 1;
            }
            Err(err) => assert!(
                matches!(err, GuessError::NotFound { .. }),
                "loser got {err:?}"
            ),
        }
    }
    assert_eq!(winners, 1);
    assert!(repo.get_by_id(created.id).await.unwrap().is_verified);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_creates_with_one_email_lose_with_already_exists() {
    let repo = setup().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create(new_account(
                    "fern@example.com",
                    &format!("tok-fern-{i}"),
                    Duration::minutes(15),
                ))
                .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(
                matches!(err, GuessError::AlreadyExists { .. }),
                "loser got {err:?}"
            ),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn replace_token_supersedes_previous() {
    let repo = setup().await;
    let created = repo
        .create(new_account("fay@example.com", "tok-old", Duration::minutes(15)))
        .await
        .unwrap();

    let updated = repo
        .replace_verification_token(
            created.id,
            "tok-new".into(),
            Utc::now() + Duration::minutes(15),
        )
        .await
        .unwrap();
    assert_eq!(updated.verification_token.as_deref(), Some("tok-new"));

    assert!(repo.consume_verification_token("tok-old").await.is_err());
    assert!(repo.consume_verification_token("tok-new").await.is_ok());
}

#[tokio::test]
async fn replace_token_refused_once_verified() {
    let repo = setup().await;
    let created = repo
        .create(new_account("gus@example.com", "tok-gus", Duration::minutes(15)))
        .await
        .unwrap();
    repo.consume_verification_token("tok-gus").await.unwrap();

    let err = repo
        .replace_verification_token(
            created.id,
            "tok-again".into(),
            Utc::now() + Duration::minutes(15),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GuessError::NotFound { .. }));

    let stored = repo.get_by_id(created.id).await.unwrap();
    assert!(stored.verification_token.is_none());
}
