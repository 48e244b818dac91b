/// Route handlers
///
/// - `health`: Health check
/// - `auth`: Register, login, logout
/// - `contacts`: Contact listing, create, edit, delete
/// - `phones`: Phones of a contact
/// - `classes`: Class listing, class creation, enrollment

pub mod auth;
pub mod classes;
pub mod contacts;
pub mod health;
pub mod phones;

/// Absolute paths of the app's pages, as links and redirects use them
pub mod paths {
    pub const CONTACTS_INDEX: &str = "/contacts/index";
    pub const ADD_CONTACT: &str = "/contacts/add_contact";
    pub const CLASSES_INDEX: &str = "/classes/index";
    pub const ADD_CLASS: &str = "/classes/add_class";

    pub fn edit_contact(id: i64) -> String {
        format!("/contacts/edit_contact/{}", id)
    }

    pub fn delete_contact(id: i64) -> String {
        format!("/contacts/delete_contact/{}", id)
    }

    pub fn phones(contact_id: i64) -> String {
        format!("/contacts/edit_phone/{}", contact_id)
    }

    pub fn add_phone(contact_id: i64) -> String {
        format!("/contacts/add_phone/{}", contact_id)
    }

    pub fn edit_phone(contact_id: i64, phone_id: i64) -> String {
        format!("/contacts/edit_phone/{}/{}", contact_id, phone_id)
    }

    pub fn delete_phone(contact_id: i64, phone_id: i64) -> String {
        format!("/contacts/delete_phone/{}/{}", contact_id, phone_id)
    }

    pub fn add_student(class_id: i64) -> String {
        format!("/classes/add_student/{}", class_id)
    }

    pub fn remove_student(class_id: i64) -> String {
        format!("/classes/remove_student/{}", class_id)
    }
}
