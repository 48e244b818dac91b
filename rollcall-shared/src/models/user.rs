/// User accounts
///
/// Rollcall identifies owners by email: contacts carry `user_email` and
/// enrollments carry `student_email`. This table only exists so the session
/// layer has something to authenticate against.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Lowercased email; the identity every owner check compares against
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: Option<String>,

    pub created_at: DateTime<Utc>,

    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email as typed; normalized before insert
    pub email: String,

    /// Argon2id hash, never the plaintext password
    pub password_hash: String,

    pub name: Option<String>,
}

/// Canonical form of an email address: trimmed and lowercased
///
/// ```
/// use rollcall_shared::models::user::normalize_email;
///
/// assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts a user
    ///
    /// # Errors
    ///
    /// A unique violation on `users_email_key` when the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, name, created_at, last_login_at
            "#,
        )
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .bind(data.name)
        .fetch_one(pool)
        .await
    }

    /// Looks a user up by email (normalized before comparison)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, created_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }

    /// Stamps `last_login_at` with the current time
    pub async fn update_last_login(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a user; owned contacts and enrollments are keyed by email and stay
    ///
    /// Accounts are not deletable over HTTP; this is for administration and
    /// test teardown.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("USER@example.com"), "user@example.com");
        assert_eq!(normalize_email("\tuser@example.com\n"), "user@example.com");
        assert_eq!(normalize_email(""), "");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 7,
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: None,
            created_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "user@example.com");
    }
}
