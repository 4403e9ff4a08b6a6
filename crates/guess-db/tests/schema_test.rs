//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    guess_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("account"), "missing account table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    guess_db::run_migrations(&db).await.unwrap();
    // Second run must be a no-op, not a "table already exists" failure.
    guess_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn unique_index_prevents_duplicate_emails() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    guess_db::run_migrations(&db).await.unwrap();

    let insert = "CREATE account SET account_id = $id, username = 'a', \
                  email = 'a@x.com', password_hash = 'h'";

    db.query(insert)
        .bind(("id", uuid::Uuid::new_v4().to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let second = db
        .query(insert)
        .bind(("id", uuid::Uuid::new_v4().to_string()))
        .await
        .unwrap()
        .check();
    assert!(second.is_err(), "duplicate email should be rejected");
}
