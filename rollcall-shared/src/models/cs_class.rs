/// Classes in the roster
///
/// Classes have no owner: every authenticated user can list them and enroll.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cs_classes (
///     id BIGSERIAL PRIMARY KEY,
///     class_name VARCHAR(255) NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Class row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CsClass {
    pub id: i64,
    pub class_name: String,
}

impl CsClass {
    pub async fn create(pool: &PgPool, class_name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CsClass>(
            "INSERT INTO cs_classes (class_name) VALUES ($1) RETURNING id, class_name",
        )
        .bind(class_name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CsClass>("SELECT id, class_name FROM cs_classes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All classes, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CsClass>("SELECT id, class_name FROM cs_classes ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Distinct classes `student_email` is enrolled in
    pub async fn list_taken_by(pool: &PgPool, student_email: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CsClass>(
            r#"
            SELECT c.id, c.class_name
            FROM cs_classes c
            WHERE EXISTS (
                SELECT 1 FROM students s
                WHERE s.class_id = c.id AND s.student_email = $1
            )
            ORDER BY c.id
            "#,
        )
        .bind(student_email)
        .fetch_all(pool)
        .await
    }

    /// Deletes a class and, through the foreign key, its enrollments
    ///
    /// No HTTP route removes classes; this is for administration and test
    /// teardown.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cs_classes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
