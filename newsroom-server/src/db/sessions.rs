//! Login sessions

use chrono::Duration;
use newsroom_common::api::generate_session_token;
use newsroom_common::db::Role;
use newsroom_common::time;
use newsroom_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::users::UserRecord;

/// An active session joined with the user's current role
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: Role,
    pub user_name: String,
    pub expires_at: String,
}

/// Open a session lasting `hours`
pub async fn create_session(pool: &SqlitePool, user: &UserRecord, hours: i64) -> Result<Session> {
    let now = time::now();
    let session = Session {
        token: generate_session_token(),
        user_id: user.id.clone(),
        role: user.role,
        user_name: user.display_name(),
        expires_at: time::format_timestamp(now + Duration::hours(hours)),
    };

    sqlx::query(
        "INSERT INTO sessions (token, user_id, user_name, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session.token)
    .bind(&session.user_id)
    .bind(&session.user_name)
    .bind(time::format_timestamp(now))
    .bind(&session.expires_at)
    .execute(pool)
    .await?;

    debug!(user_id = %session.user_id, "Session created");
    Ok(session)
}

/// Look up an unexpired session
///
/// The role comes from `users`, so a role change takes effect on the next
/// request.
pub async fn find_session(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        "SELECT s.token, s.user_id, s.user_name, s.expires_at, u.role
         FROM sessions s JOIN users u ON u.guid = s.user_id
         WHERE s.token = ? AND s.expires_at > ?",
    )
    .bind(token)
    .bind(time::format_timestamp(time::now()))
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let role: String = row.try_get("role")?;
    Ok(Some(Session {
        token: row.try_get("token")?,
        user_id: row.try_get("user_id")?,
        role: role.parse().map_err(Error::Internal)?,
        user_name: row.try_get("user_name")?,
        expires_at: row.try_get("expires_at")?,
    }))
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove expired sessions, returning how many were dropped
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(time::format_timestamp(time::now()))
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
