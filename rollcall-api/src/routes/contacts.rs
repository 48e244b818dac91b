/// Contact book
///
/// Every handler resolves the caller from the session and only touches
/// contacts whose `user_email` equals the caller's email. A contact that is
/// missing or owned by someone else sends the caller back to the listing
/// without changing anything.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    forms::{bind, FormInput, FormView, Submission},
    routes::paths,
};
use axum::{
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use rollcall_shared::{
    auth::{
        middleware::CurrentUser,
        ownership::{require_owned_contact, OwnershipError},
    },
    models::{
        contact::{Contact, CreateContact, UpdateContact},
        phone::{phone_summary, Phone},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Contact form; the owner is never a field
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 255, message = "First name must be 1 to 255 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name must be 1 to 255 characters"))]
    pub last_name: String,

    #[serde(rename = "_formkey", skip_serializing)]
    pub formkey: Option<String>,
}

impl FormInput for ContactForm {
    fn formkey(&self) -> Option<&str> {
        self.formkey.as_deref()
    }

    fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            formkey: self.formkey,
        }
    }
}

impl From<&Contact> for ContactForm {
    fn from(contact: &Contact) -> Self {
        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            formkey: None,
        }
    }
}

/// Listing page
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactIndexView {
    pub rows: Vec<ContactRow>,
    pub add_contact_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// `"555-1234 (Home), 555-9876 (Work)"`, empty without phones
    pub phone_numbers: String,

    pub links: ContactLinks,
}

/// Per-row links; all but `add_phone` are signed
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactLinks {
    pub edit: String,
    pub delete: String,
    pub phones: String,
    pub add_phone: String,
}

/// Redirect to the contact listing
pub(crate) fn to_index() -> Response {
    Redirect::to(paths::CONTACTS_INDEX).into_response()
}

/// The contact, if it exists and the caller owns it
///
/// Only database failures are errors.
pub(crate) async fn owned_contact(
    state: &AppState,
    user: &CurrentUser,
    contact_id: i64,
) -> ApiResult<Option<Contact>> {
    match require_owned_contact(&state.db, user, contact_id).await {
        Ok(contact) => Ok(Some(contact)),
        Err(OwnershipError::NotFound(id)) => {
            tracing::debug!(contact_id = id, "Contact not found");
            Ok(None)
        }
        Err(OwnershipError::NotOwner(_)) => Ok(None),
        Err(e) => Err(ApiError::from(e)),
    }
}

/// `GET /contacts/index`
pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<ContactIndexView>> {
    let contacts = Contact::list_by_owner(&state.db, &user.email).await?;
    let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
    let mut phones = Phone::list_by_contacts(&state.db, &ids).await?;

    let rows = contacts
        .into_iter()
        .map(|contact| {
            let phone_numbers = phones
                .remove(&contact.id)
                .map(|p| phone_summary(&p))
                .unwrap_or_default();

            ContactRow {
                links: ContactLinks {
                    edit: state.signed_url(&user, &paths::edit_contact(contact.id)),
                    delete: state.signed_url(&user, &paths::delete_contact(contact.id)),
                    phones: state.signed_url(&user, &paths::phones(contact.id)),
                    add_phone: paths::add_phone(contact.id),
                },
                id: contact.id,
                first_name: contact.first_name,
                last_name: contact.last_name,
                phone_numbers,
            }
        })
        .collect();

    Ok(Json(ContactIndexView {
        rows,
        add_contact_url: paths::ADD_CONTACT.to_string(),
    }))
}

/// `GET /contacts/add_contact`
pub async fn add_contact_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
) -> FormView<ContactForm> {
    FormView::new(&state.signer, &user, &uri, ContactForm::default())
}

/// `POST /contacts/add_contact`
pub async fn add_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<ContactForm>,
) -> ApiResult<Response> {
    let form = match bind(&state.signer, &user, &uri, form)? {
        Submission::Accepted(form) => form,
        Submission::Rejected(form, errors) => {
            return Ok(FormView::new(&state.signer, &user, &uri, form)
                .with_errors(errors)
                .into_response())
        }
    };

    let contact = Contact::create(
        &state.db,
        CreateContact {
            first_name: form.first_name,
            last_name: form.last_name,
            user_email: user.email.clone(),
        },
    )
    .await?;

    tracing::info!(contact_id = contact.id, user_id = user.user_id, "Contact created");
    Ok(to_index())
}

/// `GET /contacts/edit_contact/{id}` (signed)
pub async fn edit_contact_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let Some(contact) = owned_contact(&state, &user, id).await? else {
        return Ok(to_index());
    };

    Ok(FormView::new(&state.signer, &user, &uri, ContactForm::from(&contact)).into_response())
}

/// `POST /contacts/edit_contact/{id}` (signed)
pub async fn edit_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Form(form): Form<ContactForm>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, id).await?.is_none() {
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

    let updated = Contact::update(
        &state.db,
        id,
        UpdateContact {
            first_name: form.first_name,
            last_name: form.last_name,
        },
    )
    .await?;

    if updated.is_some() {
        tracing::info!(contact_id = id, user_id = user.user_id, "Contact updated");
    }
    Ok(to_index())
}

/// `GET|POST /contacts/delete_contact/{id}` (signed)
///
/// Phones go with the contact.
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    if owned_contact(&state, &user, id).await?.is_some()
        && Contact::delete(&state.db, id).await?
    {
        tracing::info!(contact_id = id, user_id = user.user_id, "Contact deleted");
    }

    Ok(to_index())
}
