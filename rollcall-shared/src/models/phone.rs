/// Phone numbers attached to a contact
///
/// Phones have no owner column of their own: they belong to whoever owns the
/// parent contact. Lookups that act on a single phone always match on both the
/// phone id and the contact id, so a phone id from one contact cannot be
/// reached through another contact's URLs.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE phones (
///     id BIGSERIAL PRIMARY KEY,
///     contact_id BIGINT NOT NULL REFERENCES contacts (id) ON DELETE CASCADE,
///     phone_number VARCHAR(64) NOT NULL,
///     phone_name VARCHAR(255) NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

/// Phone row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Phone {
    pub id: i64,
    pub contact_id: i64,
    pub phone_number: String,

    /// Label such as "Home" or "Work"
    pub phone_name: String,
}

/// Input for attaching a phone to a contact
#[derive(Debug, Clone)]
pub struct CreatePhone {
    pub contact_id: i64,
    pub phone_number: String,
    pub phone_name: String,
}

/// Renders phones as `"555-1234 (Home), 555-9876 (Work)"`
///
/// Entries keep the slice order and are separated by `", "`; no separator
/// follows the last entry. No phones yields an empty string.
///
/// ```
/// use rollcall_shared::models::phone::{phone_summary, Phone};
///
/// let phones = vec![Phone {
///     id: 1,
///     contact_id: 1,
///     phone_number: "555-1234".to_string(),
///     phone_name: "Home".to_string(),
/// }];
/// assert_eq!(phone_summary(&phones), "555-1234 (Home)");
/// ```
pub fn phone_summary(phones: &[Phone]) -> String {
    phones
        .iter()
        .map(|p| format!("{} ({})", p.phone_number, p.phone_name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Phone {
    pub async fn create(pool: &PgPool, data: CreatePhone) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Phone>(
            r#"
            INSERT INTO phones (contact_id, phone_number, phone_name)
            VALUES ($1, $2, $3)
            RETURNING id, contact_id, phone_number, phone_name
            "#,
        )
        .bind(data.contact_id)
        .bind(data.phone_number)
        .bind(data.phone_name)
        .fetch_one(pool)
        .await
    }

    /// Phones of one contact in insertion order
    pub async fn list_by_contact(pool: &PgPool, contact_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Phone>(
            r#"
            SELECT id, contact_id, phone_number, phone_name
            FROM phones
            WHERE contact_id = $1
            ORDER BY id
            "#,
        )
        .bind(contact_id)
        .fetch_all(pool)
        .await
    }

    /// Phones of many contacts in one round trip, grouped by contact id
    ///
    /// Each group keeps insertion order. Contacts without phones are absent
    /// from the map.
    pub async fn list_by_contacts(
        pool: &PgPool,
        contact_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Self>>, sqlx::Error> {
        if contact_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let phones = sqlx::query_as::<_, Phone>(
            r#"
            SELECT id, contact_id, phone_number, phone_name
            FROM phones
            WHERE contact_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(contact_ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Self>> = HashMap::new();
        for phone in phones {
            grouped.entry(phone.contact_id).or_default().push(phone);
        }

        Ok(grouped)
    }

    /// Finds a phone only if it belongs to `contact_id`
    pub async fn find_for_contact(
        pool: &PgPool,
        phone_id: i64,
        contact_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Phone>(
            r#"
            SELECT id, contact_id, phone_number, phone_name
            FROM phones
            WHERE id = $1 AND contact_id = $2
            "#,
        )
        .bind(phone_id)
        .bind(contact_id)
        .fetch_optional(pool)
        .await
    }

    /// Rewrites number and label of the phone matching both ids
    pub async fn update_for_contact(
        pool: &PgPool,
        phone_id: i64,
        contact_id: i64,
        phone_number: String,
        phone_name: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Phone>(
            r#"
            UPDATE phones
            SET phone_number = $3, phone_name = $4
            WHERE id = $1 AND contact_id = $2
            RETURNING id, contact_id, phone_number, phone_name
            "#,
        )
        .bind(phone_id)
        .bind(contact_id)
        .bind(phone_number)
        .bind(phone_name)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the phone matching both ids; `false` when nothing matched
    pub async fn delete_for_contact(
        pool: &PgPool,
        phone_id: i64,
        contact_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM phones WHERE id = $1 AND contact_id = $2")
            .bind(phone_id)
            .bind(contact_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(id: i64, number: &str, label: &str) -> Phone {
        Phone {
            id,
            contact_id: 1,
            phone_number: number.to_string(),
            phone_name: label.to_string(),
        }
    }

    #[test]
    fn test_phone_summary_empty() {
        assert_eq!(phone_summary(&[]), "");
    }

    #[test]
    fn test_phone_summary_single_entry_has_no_separator() {
        let phones = vec![phone(1, "555-1234", "Home")];
        assert_eq!(phone_summary(&phones), "555-1234 (Home)");
    }

    #[test]
    fn test_phone_summary_keeps_order() {
        let phones = vec![
            phone(1, "555-1234", "Home"),
            phone(2, "555-9876", "Work"),
            phone(3, "555-0000", "Cell"),
        ];
        assert_eq!(
            phone_summary(&phones),
            "555-1234 (Home), 555-9876 (Work), 555-0000 (Cell)"
        );
    }
}
