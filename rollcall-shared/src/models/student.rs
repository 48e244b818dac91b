/// Enrollments
///
/// A `students` row links a user email to a class. Users enroll themselves:
/// the class id comes from the URL and the email from the session, never
/// from the submitted form. `(class_id, student_email)` is unique, so
/// enrolling twice updates the name and year of the existing row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE students (
///     id BIGSERIAL PRIMARY KEY,
///     class_id BIGINT NOT NULL REFERENCES cs_classes (id) ON DELETE CASCADE,
///     student_name VARCHAR(255) NOT NULL,
///     year VARCHAR(32) NOT NULL,
///     student_email VARCHAR(255) NOT NULL,
///     UNIQUE (class_id, student_email)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

/// Number of classes in the curriculum; the denominator of the completion
/// percentage
pub const CURRICULUM_SIZE: usize = 4;

/// Enrollment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub class_id: i64,
    pub student_name: String,
    pub year: String,
    pub student_email: String,
}

/// Input for enrolling in a class
#[derive(Debug, Clone)]
pub struct Enroll {
    pub class_id: i64,
    pub student_name: String,
    pub year: String,
    pub student_email: String,
}

/// Renders a class roster as `"Ada (2) Grace (3) "`
///
/// Every entry, the last one included, is followed by a single space.
/// An empty roster yields an empty string.
///
/// ```
/// use rollcall_shared::models::student::{roster_summary, Student};
///
/// let roster = vec![Student {
///     id: 1,
///     class_id: 1,
///     student_name: "Ada".to_string(),
///     year: "2".to_string(),
///     student_email: "ada@example.com".to_string(),
/// }];
/// assert_eq!(roster_summary(&roster), "Ada (2) ");
/// ```
pub fn roster_summary(students: &[Student]) -> String {
    students
        .iter()
        .map(|s| format!("{} ({}) ", s.student_name, s.year))
        .collect()
}

/// Share of the curriculum a user has taken, in percent
///
/// `taken` is the number of distinct classes the user is enrolled in. The
/// value is not capped: more than [`CURRICULUM_SIZE`] classes exceeds 100.
///
/// ```
/// use rollcall_shared::models::student::enrollment_percent;
///
/// assert_eq!(enrollment_percent(2), 50.0);
/// ```
pub fn enrollment_percent(taken: usize) -> f64 {
    taken as f64 / CURRICULUM_SIZE as f64 * 100.0
}

impl Student {
    /// Enrolls `student_email` in the class, or refreshes name and year if
    /// already enrolled
    pub async fn enroll(pool: &PgPool, data: Enroll) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (class_id, student_name, year, student_email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (class_id, student_email)
            DO UPDATE SET student_name = EXCLUDED.student_name, year = EXCLUDED.year
            RETURNING id, class_id, student_name, year, student_email
            "#,
        )
        .bind(data.class_id)
        .bind(data.student_name)
        .bind(data.year)
        .bind(data.student_email)
        .fetch_one(pool)
        .await
    }

    /// Every enrollment grouped by class id, each group in insertion order
    pub async fn list_grouped_by_class(
        pool: &PgPool,
    ) -> Result<HashMap<i64, Vec<Self>>, sqlx::Error> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, class_id, student_name, year, student_email
            FROM students
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Self>> = HashMap::new();
        for student in students {
            grouped.entry(student.class_id).or_default().push(student);
        }

        Ok(grouped)
    }

    pub async fn find_enrollment(
        pool: &PgPool,
        student_email: &str,
        class_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            r#"
            SELECT id, class_id, student_name, year, student_email
            FROM students
            WHERE student_email = $1 AND class_id = $2
            "#,
        )
        .bind(student_email)
        .bind(class_id)
        .fetch_optional(pool)
        .await
    }

    /// Removes the enrollment of `student_email` in `class_id`
    pub async fn unenroll(
        pool: &PgPool,
        student_email: &str,
        class_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE student_email = $1 AND class_id = $2")
            .bind(student_email)
            .bind(class_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str, year: &str) -> Student {
        Student {
            id,
            class_id: 1,
            student_name: name.to_string(),
            year: year.to_string(),
            student_email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[test]
    fn test_roster_summary_empty() {
        assert_eq!(roster_summary(&[]), "");
    }

    #[test]
    fn test_roster_summary_trailing_space_after_each_entry() {
        let roster = vec![student(1, "Ada", "2"), student(2, "Grace", "3")];
        assert_eq!(roster_summary(&roster), "Ada (2) Grace (3) ");
    }

    #[test]
    fn test_enrollment_percent() {
        assert_eq!(enrollment_percent(0), 0.0);
        assert_eq!(enrollment_percent(1), 25.0);
        assert_eq!(enrollment_percent(2), 50.0);
        assert_eq!(enrollment_percent(4), 100.0);
    }

    #[test]
    fn test_enrollment_percent_is_not_capped() {
        assert_eq!(enrollment_percent(5), 125.0);
    }
}
