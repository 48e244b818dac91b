/// Phones of a contact
///
/// Phones have no owner column; each handler checks the parent contact with
/// [`owned_contact`] and only then touches phones matching both the phone id
/// and the contact id.

use crate::{
    app::AppState,
    error::ApiResult,
    forms::{bind, FormInput, FormView, Submission},
    routes::{
        contacts::{owned_contact, to_index},
        paths,
    },
};
use axum::{
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use rollcall_shared::{
    auth::middleware::CurrentUser,
    models::{
        contact::Contact,
        phone::{CreatePhone, Phone},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Two-field phone form: number and label
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PhoneForm {
    #[validate(length(min = 1, max = 64, message = "Phone number must be 1 to 64 characters"))]
    pub phone: String,

    /// Label such as "Home" or "Work"
    #[validate(length(min = 1, max = 255, message = "Phone type must be 1 to 255 characters"))]
    pub kind: String,

    #[serde(rename = "_formkey", skip_serializing)]
    pub formkey: Option<String>,
}

impl FormInput for PhoneForm {
    fn formkey(&self) -> Option<&str> {
        self.formkey.as_deref()
    }

    fn normalized(self) -> Self {
        Self {
            phone: self.phone.trim().to_string(),
            kind: self.kind.trim().to_string(),
            formkey: self.formkey,
        }
    }
}

impl From<&Phone> for PhoneForm {
    fn from(phone: &Phone) -> Self {
        Self {
            phone: phone.phone_number.clone(),
            kind: phone.phone_name.clone(),
            formkey: None,
        }
    }
}

/// Phone list of one contact
#[derive(Debug, Serialize, Deserialize)]
pub struct PhoneListView {
    pub contact: Contact,
    pub phones: Vec<PhoneRow>,
    pub add_phone_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhoneRow {
    pub id: i64,
    pub phone_number: String,
    pub phone_name: String,
    pub links: PhoneLinks,
}

/// Signed links for one phone
#[derive(Debug, Serialize, Deserialize)]
pub struct PhoneLinks {
    pub edit: String,
    pub delete: String,
}

/// `GET|POST /contacts/edit_phone/{id}` (signed)
pub async fn list_phones(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(contact_id): Path<i64>,
) -> ApiResult<Response> {
    let Some(contact) = owned_contact(&state, &user, contact_id).await? else {
        return Ok(to_index());
    };

    let phones = Phone::list_by_contact(&state.db, contact.id)
        .await?
        .into_iter()
        .map(|phone| PhoneRow {
            links: PhoneLinks {
                edit: state.signed_url(&user, &paths::edit_phone(contact.id, phone.id)),
                delete: state.signed_url(&user, &paths::delete_phone(contact.id, phone.id)),
            },
            id: phone.id,
            phone_number: phone.phone_number,
            phone_name: phone.phone_name,
        })
        .collect();

    let add_phone_url = paths::add_phone(contact.id);
    Ok(Json(PhoneListView {
        contact,
        phones,
        add_phone_url,
    })
    .into_response())
}

/// `GET /contacts/add_phone/{id}`
pub async fn add_phone_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path(contact_id): Path<i64>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, contact_id).await?.is_none() {
        return Ok(to_index());
    }

    Ok(FormView::new(&state.signer, &user, &uri, PhoneForm::default()).into_response())
}

/// `POST /contacts/add_phone/{id}`
pub async fn add_phone(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path(contact_id): Path<i64>,
    Form(form): Form<PhoneForm>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, contact_id).await?.is_none() {
        return Ok(to_index());
    }

    let form = match bind(&state.signer, &user, &uri, form)? {
        Submission::Accepted(form) => form,
        Submission::Rejected(form, errors) => {
            return Ok(FormView::new(&state.signer, &user, &uri, form)
                .with_errors(errors)
                .into_response())
        }
    };

    let phone = Phone::create(
        &state.db,
        CreatePhone {
            contact_id,
            phone_number: form.phone,
            phone_name: form.kind,
        },
    )
    .await?;

    tracing::info!(phone_id = phone.id, contact_id, "Phone added");
    Ok(to_index())
}

/// `GET /contacts/edit_phone/{id}/{phone_id}` (signed)
pub async fn edit_phone_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path((contact_id, phone_id)): Path<(i64, i64)>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, contact_id).await?.is_none() {
        return Ok(to_index());
    }

    let Some(phone) = Phone::find_for_contact(&state.db, phone_id, contact_id).await? else {
        tracing::debug!(phone_id, contact_id, "Phone not found for contact");
        return Ok(to_index());
    };

    Ok(FormView::new(&state.signer, &user, &uri, PhoneForm::from(&phone)).into_response())
}

/// `POST /contacts/edit_phone/{id}/{phone_id}` (signed)
pub async fn edit_phone(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path((contact_id, phone_id)): Path<(i64, i64)>,
    Form(form): Form<PhoneForm>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, contact_id).await?.is_none() {
        return Ok(to_index());
    }

    let form = match bind(&state.signer, &user, &uri, form)? {
        Submission::Accepted(form) => form,
        Submission::Rejected(form, errors) => {
            return Ok(FormView::new(&state.signer, &user, &uri, form)
                .with_errors(errors)
                .into_response())
        }
    };

    match Phone::update_for_contact(&state.db, phone_id, contact_id, form.phone, form.kind).await? {
        Some(_) => tracing::info!(phone_id, contact_id, "Phone updated"),
        None => tracing::debug!(phone_id, contact_id, "Phone not found for contact"),
    }

    Ok(to_index())
}

/// `GET|POST /contacts/delete_phone/{id}/{phone_id}` (signed)
pub async fn delete_phone(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((contact_id, phone_id)): Path<(i64, i64)>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, contact_id).await?.is_some()
        && Phone::delete_for_contact(&state.db, phone_id, contact_id).await?
    {
        tracing::info!(phone_id, contact_id, "Phone deleted");
    }

    Ok(to_index())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_from_phone() {
        let phone = Phone {
            id: 2,
            contact_id: 1,
            phone_number: "555-1234".to_string(),
            phone_name: "Home".to_string(),
        };

        let form = PhoneForm::from(&phone);
        assert_eq!(form.phone, "555-1234");
        assert_eq!(form.kind, "Home");
    }

    #[test]
    fn test_blank_fields_fail_validation() {
        let form = PhoneForm {
            phone: "   ".to_string(),
            kind: "Home".to_string(),
            formkey: None,
        }
        .normalized();

        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
        assert!(!errors.field_errors().contains_key("kind"));
    }

    #[test]
    fn test_number_longer_than_column_fails_validation() {
        let form = PhoneForm {
            phone: "5".repeat(65),
            kind: "Home".to_string(),
            formkey: None,
        };
        assert!(form.validate().unwrap_err().field_errors().contains_key("phone"));

        let form = PhoneForm {
            phone: "5".repeat(64),
            ..form
        };
        assert!(form.validate().is_ok());
    }
}
