//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date.
//! Every statement is idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables, indexes and the full-text index
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_users_table(pool).await?;
    create_sessions_table(pool).await?;
    create_news_table(pool).await?;
    create_news_indexes(pool).await?;

    if let Err(e) = create_news_fts(pool).await {
        warn!("Full-text index unavailable, search will use substring matching: {}", e);
    }

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            age INTEGER,
            location TEXT,
            role TEXT NOT NULL DEFAULT 'user'
                CHECK (role IN ('admin', 'news_reporter', 'user')),
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            liked_articles TEXT NOT NULL DEFAULT '[]',
            shared_articles TEXT NOT NULL DEFAULT '[]',
            reading_history TEXT NOT NULL DEFAULT '[]',
            category_preferences TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            user_name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_news_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            guid TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            summary TEXT NOT NULL DEFAULT '',
            full_text TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL DEFAULT '',
            published_at TEXT NOT NULL,
            date TEXT NOT NULL,
            week INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            time TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'general',
            credibility REAL NOT NULL DEFAULT 0.5,
            fake_prob REAL NOT NULL DEFAULT 0.5,
            status TEXT NOT NULL DEFAULT 'monitoring'
                CHECK (status IN ('monitoring', 'verified', 'flagged')),
            sentiment TEXT NOT NULL DEFAULT 'neutral',
            sentiment_score REAL NOT NULL DEFAULT 0.0,
            images TEXT NOT NULL DEFAULT '[]',
            videos TEXT NOT NULL DEFAULT '[]',
            district TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            reporter_id TEXT,
            reporter_name TEXT,
            evidence_sources TEXT NOT NULL DEFAULT '[]',
            breaking INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_news_indexes(pool: &SqlitePool) -> Result<()> {
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_news_category ON news(category)",
        "CREATE INDEX IF NOT EXISTS idx_news_created_at ON news(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_news_category_created ON news(category, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_news_published_at ON news(published_at)",
        "CREATE INDEX IF NOT EXISTS idx_news_credibility ON news(credibility)",
        "CREATE INDEX IF NOT EXISTS idx_news_sentiment_score ON news(sentiment_score)",
        "CREATE INDEX IF NOT EXISTS idx_news_reporter ON news(reporter_id)",
        "CREATE INDEX IF NOT EXISTS idx_news_date ON news(date)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}

/// External-content FTS5 index over the searchable news columns
///
/// Triggers keep it in step with `news`. A build of SQLite without FTS5
/// fails on the first statement, which the caller logs and tolerates.
async fn create_news_fts(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS news_fts USING fts5(
            title, full_text, content, category,
            content='news', content_rowid='seq'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS news_fts_insert AFTER INSERT ON news BEGIN
            INSERT INTO news_fts(rowid, title, full_text, content, category)
            VALUES (new.seq, new.title, new.full_text, new.content, new.category);
        END
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS news_fts_delete AFTER DELETE ON news BEGIN
            INSERT INTO news_fts(news_fts, rowid, title, full_text, content, category)
            VALUES ('delete', old.seq, old.title, old.full_text, old.content, old.category);
        END
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS news_fts_update AFTER UPDATE ON news BEGIN
            INSERT INTO news_fts(news_fts, rowid, title, full_text, content, category)
            VALUES ('delete', old.seq, old.title, old.full_text, old.content, old.category);
            INSERT INTO news_fts(rowid, title, full_text, content, category)
            VALUES (new.seq, new.title, new.full_text, new.content, new.category);
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Whether the full-text index exists in this database
pub async fn has_fulltext_index(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'news_fts'",
    )
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}
