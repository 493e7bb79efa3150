use async_trait::async_trait;
use shared::models::User;
use sqlx::PgPool;

use crate::auth::admin_auth::AccountLookup;
use crate::receipt::StoreError;

const COLUMNS: &str =
    "user_id, name, email, hashed_password, role, status, email_type, sender_email, created_at";

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub role: &'a str,
    pub email_type: Option<&'a str>,
    pub sender_email: Option<&'a str>,
}

pub async fn create(pool: &PgPool, user: &NewUser<'_>, now: i64) -> Result<i64, sqlx::Error> {
    let (user_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (name, email, hashed_password, role, status, email_type, sender_email, created_at)
         VALUES ($1, $2, $3, $4, 'active', $5, $6, $7)
         RETURNING user_id",
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.hashed_password)
    .bind(user.role)
    .bind(user.email_type)
    .bind(user.sender_email)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(user_id)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

#[async_trait]
impl AccountLookup for PgPool {
    async fn find_account(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(find_by_id(self, user_id).await?)
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM users ORDER BY user_id"))
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub struct UserChanges<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub status: &'a str,
    pub email_type: Option<&'a str>,
    pub sender_email: Option<&'a str>,
}

/// Returns `false` when no user has this id
pub async fn update(
    pool: &PgPool,
    user_id: i64,
    changes: &UserChanges<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET name = $1, email = $2, role = $3, status = $4, email_type = $5, sender_email = $6
         WHERE user_id = $7",
    )
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.role)
    .bind(changes.status)
    .bind(changes.email_type)
    .bind(changes.sender_email)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `false` when no user has this email
pub async fn update_password(
    pool: &PgPool,
    email: &str,
    hashed_password: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET hashed_password = $1 WHERE lower(email) = lower($2)")
            .bind(hashed_password)
            .bind(email)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
