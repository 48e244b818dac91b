/// Owner checks for contacts
///
/// A contact belongs to the user whose email it carries. Every contact and
/// phone operation resolves the contact through [`require_owned_contact`]
/// first; phones inherit their contact's owner.

use sqlx::PgPool;

use super::middleware::CurrentUser;
use crate::models::contact::Contact;

/// Why an owner check failed
#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    #[error("Contact {0} not found")]
    NotFound(i64),

    #[error("Contact {0} is owned by another user")]
    NotOwner(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Exact, case-sensitive comparison of the caller's email with the owner
pub fn is_contact_owner(user: &CurrentUser, contact: &Contact) -> bool {
    contact.user_email == user.email
}

/// Loads `contact_id` if it exists and belongs to `user`
pub async fn require_owned_contact(
    pool: &PgPool,
    user: &CurrentUser,
    contact_id: i64,
) -> Result<Contact, OwnershipError> {
    let contact = Contact::find_by_id(pool, contact_id)
        .await?
        .ok_or(OwnershipError::NotFound(contact_id))?;

    if !is_contact_owner(user, &contact) {
        tracing::warn!(
            contact_id,
            user_id = user.user_id,
            "Rejected access to a contact owned by another user"
        );
        return Err(OwnershipError::NotOwner(contact_id));
    }

    Ok(contact)
}
