/// Database models for Rollcall
///
/// Each model owns its SQL. Functions take `&PgPool` and return
/// `sqlx::Error`, leaving HTTP mapping to the API crate.
///
/// # Models
///
/// - `user`: Accounts used by the session layer
/// - `contact`: Contacts owned by a user email
/// - `phone`: Phone numbers owned through their contact
/// - `cs_class`: Classes, visible to every user
/// - `student`: Enrollment of a user email in a class
///
/// # Example
///
/// ```no_run
/// use rollcall_shared::models::contact::{Contact, CreateContact};
/// use rollcall_shared::models::phone::{phone_summary, Phone};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let contact = Contact::create(&pool, CreateContact {
///     first_name: "Jane".to_string(),
///     last_name: "Doe".to_string(),
///     user_email: "jane@example.com".to_string(),
/// }).await?;
///
/// let phones = Phone::list_by_contact(&pool, contact.id).await?;
/// println!("{}", phone_summary(&phones));
/// # Ok(())
/// # }
/// ```

pub mod contact;
pub mod cs_class;
pub mod phone;
pub mod student;
pub mod user;
