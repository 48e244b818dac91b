/// Form binding
///
/// A form view is the JSON a template would render: the action URL, the form
/// key the submission must echo back, the current values and any inline
/// errors. Binding a submission checks the form key first, then trims and
/// validates the fields.
///
/// ```text
/// GET  -> FormView (200)
/// POST -> bad/missing _formkey -> 403
///      -> validation errors    -> FormView with errors (422)
///      -> accepted             -> handler persists and redirects
/// ```

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use rollcall_shared::auth::{middleware::CurrentUser, url_signer::UrlSigner};
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};

/// Data for rendering a form
#[derive(Debug, Serialize)]
pub struct FormView<T> {
    /// Where the form posts to; keeps the link signature when there is one
    pub action: String,

    /// Value for the hidden `_formkey` field
    pub formkey: String,

    pub values: T,
    pub errors: Vec<ValidationErrorDetail>,
}

impl<T: Serialize> FormView<T> {
    /// Form posting back to the URI it was requested from
    pub fn new(signer: &UrlSigner, user: &CurrentUser, uri: &Uri, values: T) -> Self {
        let action = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        Self {
            action,
            formkey: signer.form_key(user.session_id, uri.path()),
            values,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<ValidationErrorDetail>) -> Self {
        self.errors = errors;
        self
    }
}

impl<T: Serialize> IntoResponse for FormView<T> {
    fn into_response(self) -> Response {
        let status = if self.errors.is_empty() {
            StatusCode::OK
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };

        (status, Json(self)).into_response()
    }
}

/// A submitted form
pub trait FormInput: Validate + Sized {
    /// The echoed `_formkey` field
    fn formkey(&self) -> Option<&str>;

    /// Trims user input before validation
    fn normalized(self) -> Self;
}

/// Outcome of binding a submission
#[derive(Debug)]
pub enum Submission<F> {
    Accepted(F),
    Rejected(F, Vec<ValidationErrorDetail>),
}

/// Verifies the form key and validates `form`
///
/// # Errors
///
/// `ApiError::Forbidden` when the form key is missing or was not issued for
/// this action in this session.
pub fn bind<F: FormInput>(
    signer: &UrlSigner,
    user: &CurrentUser,
    uri: &Uri,
    form: F,
) -> ApiResult<Submission<F>> {
    signer
        .verify_form_key(user.session_id, uri.path(), form.formkey())
        .map_err(|e| {
            tracing::warn!(path = %uri.path(), user_id = user.user_id, error = %e, "Rejected form key");
            ApiError::from(e)
        })?;

    let form = form.normalized();
    match form.validate() {
        Ok(()) => Ok(Submission::Accepted(form)),
        Err(e) => {
            let errors = validation_details(&e);
            tracing::debug!(path = %uri.path(), errors = errors.len(), "Form rejected");
            Ok(Submission::Rejected(form, errors))
        }
    }
}

/// Flattens validator output, ordered by field name
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Validation-failure response for JSON-style endpoints
pub fn validate_or_reject<F: Validate>(form: &F) -> ApiResult<()> {
    form.validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))
}
