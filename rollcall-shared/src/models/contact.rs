/// Contacts in a user's address book
///
/// A contact is owned by exactly one user, identified by `user_email`. The
/// owner is assigned by the server at creation and never changes; storage does
/// not enforce ownership, so every handler runs the owner check in
/// [`crate::auth::ownership`] before reading or mutating a contact.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contacts (
///     id BIGSERIAL PRIMARY KEY,
///     first_name VARCHAR(255) NOT NULL CHECK (btrim(first_name) <> ''),
///     last_name VARCHAR(255) NOT NULL CHECK (btrim(last_name) <> ''),
///     user_email VARCHAR(255) NOT NULL
/// );
/// ```
///
/// Deleting a contact cascades to its phones.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Contact row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Owner; never bound from user input
    pub user_email: String,
}

/// Input for creating a contact
#[derive(Debug, Clone)]
pub struct CreateContact {
    pub first_name: String,
    pub last_name: String,
    pub user_email: String,
}

/// Editable fields of a contact
#[derive(Debug, Clone)]
pub struct UpdateContact {
    pub first_name: String,
    pub last_name: String,
}

impl Contact {
    pub async fn create(pool: &PgPool, data: CreateContact) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (first_name, last_name, user_email)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, user_email
            "#,
        )
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.user_email)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            "SELECT id, first_name, last_name, user_email FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Every contact owned by `user_email`, oldest first
    pub async fn list_by_owner(pool: &PgPool, user_email: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, user_email
            FROM contacts
            WHERE user_email = $1
            ORDER BY id
            "#,
        )
        .bind(user_email)
        .fetch_all(pool)
        .await
    }

    /// Rewrites the name fields; the owner column is untouched
    ///
    /// Returns `None` when the contact no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateContact,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET first_name = $2, last_name = $3
            WHERE id = $1
            RETURNING id, first_name, last_name, user_email
            "#,
        )
        .bind(id)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a contact and, through the foreign key, its phones
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
