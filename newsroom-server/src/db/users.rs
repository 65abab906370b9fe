//! User accounts

use newsroom_common::db::Role;
use newsroom_common::time;
use newsroom_common::{Error, Result};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::info;
use uuid::Uuid;

const USER_COLUMNS: &str = "guid, first_name, last_name, email, age, location, role, created_at";

/// A user as shown to admins; credentials are never loaded here
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl UserRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Registration data with an already hashed password
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub password_salt: String,
}

/// What login needs to check a password
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: UserRecord,
    pub password_hash: String,
    pub password_salt: String,
}

/// Emails are compared trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn row_to_user(row: &SqliteRow) -> Result<UserRecord> {
    let role: String = row.try_get("role")?;
    Ok(UserRecord {
        id: row.try_get("guid")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        age: row.try_get("age")?,
        location: row.try_get("location")?,
        role: role.parse().map_err(Error::Internal)?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a user and return the stored record
///
/// A second account with the same email is a [`Error::Conflict`].
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<UserRecord> {
    let record = UserRecord {
        id: Uuid::new_v4().to_string(),
        first_name: new_user.first_name.trim().to_string(),
        last_name: new_user.last_name.trim().to_string(),
        email: normalize_email(&new_user.email),
        age: new_user.age,
        location: new_user.location.filter(|l| !l.trim().is_empty()),
        role: new_user.role,
        created_at: time::format_timestamp(time::now()),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO users (guid, first_name, last_name, email, age, location, role,
                           password_hash, password_salt, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.email)
    .bind(record.age)
    .bind(&record.location)
    .bind(record.role.as_str())
    .bind(&new_user.password_hash)
    .bind(&new_user.password_salt)
    .bind(&record.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!(user_id = %record.id, role = %record.role, "Registered user");
            Ok(record)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(Error::Conflict("Email already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_credentials_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<StoredCredentials>> {
    let sql = format!(
        "SELECT {}, password_hash, password_salt FROM users WHERE email = ?",
        USER_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(StoredCredentials {
            user: row_to_user(&row)?,
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
        })),
        None => Ok(None),
    }
}

pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRecord>> {
    let sql = format!("SELECT {} FROM users WHERE guid = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(row_to_user).transpose()
}

fn push_role_filter(qb: &mut QueryBuilder<'_, Sqlite>, role: Option<Role>) {
    if let Some(role) = role {
        qb.push(" WHERE role = ").push_bind(role.as_str());
    }
}

pub async fn count_users(pool: &SqlitePool, role: Option<Role>) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
    push_role_filter(&mut qb, role);
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

/// One page of users, newest first
pub async fn list_users_page(
    pool: &SqlitePool,
    role: Option<Role>,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserRecord>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM users", USER_COLUMNS));
    push_role_filter(&mut qb, role);
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(row_to_user).collect()
}

/// Returns false when no user has `id`
pub async fn update_role(pool: &SqlitePool, id: &str, role: Role) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET role = ? WHERE guid = ?")
        .bind(role.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!(user_id = %id, role = %role, "Updated user role");
    }
    Ok(result.rows_affected() > 0)
}

/// Delete a user; their sessions go with them
///
/// Returns false when no user has `id`.
pub async fn delete_user(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!(user_id = %id, "Deleted user");
    }
    Ok(result.rows_affected() > 0)
}
