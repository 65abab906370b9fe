//! Tests for database initialization

use newsroom_common::db::init::{has_fulltext_index, init_database, SCHEMA_VERSION};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("newsroom.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("newsroom.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO users (guid, first_name, last_name, email, role, password_hash, password_salt, created_at)
         VALUES ('u1', 'A', 'B', 'a@b.c', 'user', 'h', 's', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool1)
    .await
    .unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool2.unwrap())
        .await
        .unwrap();
    assert_eq!(count, 1, "Reopening must keep existing rows");
}

#[tokio::test]
async fn test_schema_version_recorded() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("newsroom.db")).await.unwrap();

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_role_check_constraint() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("newsroom.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO users (guid, first_name, last_name, email, role, password_hash, password_salt, created_at)
         VALUES ('u1', 'A', 'B', 'a@b.c', 'superuser', 'h', 's', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Unknown role must be rejected");
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("newsroom.db")).await.unwrap();

    let insert = |guid: &'static str| {
        sqlx::query(
            "INSERT INTO users (guid, first_name, last_name, email, role, password_hash, password_salt, created_at)
             VALUES (?, 'A', 'B', 'same@b.c', 'user', 'h', 's', '2024-01-01T00:00:00Z')",
        )
        .bind(guid)
    };

    insert("u1").execute(&pool).await.unwrap();
    assert!(insert("u2").execute(&pool).await.is_err());
}

#[tokio::test]
async fn test_sessions_cascade_on_user_delete() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("newsroom.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO users (guid, first_name, last_name, email, role, password_hash, password_salt, created_at)
         VALUES ('u1', 'A', 'B', 'a@b.c', 'user', 'h', 's', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO sessions (token, user_id, user_name, created_at, expires_at)
         VALUES ('t1', 'u1', 'A B', '2024-01-01T00:00:00Z', '2024-01-02T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM users WHERE guid = 'u1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_fulltext_index_tracks_news_rows() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("newsroom.db")).await.unwrap();

    if !has_fulltext_index(&pool).await.unwrap() {
        // SQLite built without FTS5; substring search covers this case
        return;
    }

    sqlx::query(
        "INSERT INTO news (guid, title, full_text, published_at, date, week, month, year, time, created_at)
         VALUES ('n1', 'Monsoon arrives early', 'Heavy rain in Kerala', '2024-06-01T00:00:00Z',
                 '2024-06-01', 22, 6, 2024, '00:00:00', '2024-06-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let hits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_fts WHERE news_fts MATCH 'kerala'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(hits, 1);

    sqlx::query("UPDATE news SET full_text = 'Heavy rain in Goa' WHERE guid = 'n1'")
        .execute(&pool)
        .await
        .unwrap();

    let stale: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_fts WHERE news_fts MATCH 'kerala'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stale, 0);
}
