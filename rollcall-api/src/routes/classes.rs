/// Class roster
///
/// Classes are shared by all users. A user enrolls themselves: the class comes
/// from the path and the student email from the session, so the form only
/// carries the student's name and year.

use crate::{
    app::AppState,
    error::ApiResult,
    forms::{bind, FormInput, FormView, Submission},
    routes::paths,
};
use axum::{
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use rollcall_shared::{
    auth::middleware::CurrentUser,
    models::{
        cs_class::CsClass,
        student::{enrollment_percent, roster_summary, Enroll, Student},
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClassForm {
    #[validate(length(min = 1, max = 255, message = "Class name must be 1 to 255 characters"))]
    pub class_name: String,

    #[serde(rename = "_formkey", skip_serializing)]
    pub formkey: Option<String>,
}

impl FormInput for ClassForm {
    fn formkey(&self) -> Option<&str> {
        self.formkey.as_deref()
    }

    fn normalized(self) -> Self {
        Self {
            class_name: self.class_name.trim().to_string(),
            formkey: self.formkey,
        }
    }
}

/// Enrollment form
///
/// Unknown fields such as `class_id` or `student_email` are ignored.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StudentForm {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub student_name: String,

    #[validate(length(min = 1, max = 32, message = "Year must be 1 to 32 characters"))]
    pub year: String,

    #[serde(rename = "_formkey", skip_serializing)]
    pub formkey: Option<String>,
}

impl FormInput for StudentForm {
    fn formkey(&self) -> Option<&str> {
        self.formkey.as_deref()
    }

    fn normalized(self) -> Self {
        Self {
            student_name: self.student_name.trim().to_string(),
            year: self.year.trim().to_string(),
            formkey: self.formkey,
        }
    }
}

/// Listing page
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassIndexView {
    pub classes: Vec<ClassRow>,

    /// Names of the classes the caller is enrolled in
    pub taken_classes: Vec<String>,

    /// Share of the curriculum the caller has taken; may exceed 100
    pub percent: f64,

    pub add_class_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassRow {
    pub id: i64,
    pub class_name: String,

    /// `"Ada (2) Alan (3) "`, empty when nobody is enrolled
    pub students: String,

    /// Whether the caller is enrolled
    pub enrolled: bool,

    pub links: ClassLinks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassLinks {
    pub add_student: String,

    /// Signed
    pub remove_student: String,
}

fn to_index() -> Response {
    Redirect::to(paths::CLASSES_INDEX).into_response()
}

/// `GET /classes/index`
pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<ClassIndexView>> {
    let classes = CsClass::list(&state.db).await?;
    let mut rosters = Student::list_grouped_by_class(&state.db).await?;
    let taken = CsClass::list_taken_by(&state.db, &user.email).await?;

    let taken_ids: HashSet<i64> = taken.iter().map(|c| c.id).collect();
    let percent = enrollment_percent(taken.len());

    let classes = classes
        .into_iter()
        .map(|class| ClassRow {
            students: rosters
                .remove(&class.id)
                .map(|roster| roster_summary(&roster))
                .unwrap_or_default(),
            enrolled: taken_ids.contains(&class.id),
            links: ClassLinks {
                add_student: paths::add_student(class.id),
                remove_student: state.signed_url(&user, &paths::remove_student(class.id)),
            },
            id: class.id,
            class_name: class.class_name,
        })
        .collect();

    Ok(Json(ClassIndexView {
        classes,
        taken_classes: taken.into_iter().map(|c| c.class_name).collect(),
        percent,
        add_class_url: paths::ADD_CLASS.to_string(),
    }))
}

/// `GET /classes/add_class`
pub async fn add_class_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
) -> FormView<ClassForm> {
    FormView::new(&state.signer, &user, &uri, ClassForm::default())
}

/// `POST /classes/add_class`
pub async fn add_class(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<ClassForm>,
) -> ApiResult<Response> {
    let form = match bind(&state.signer, &user, &uri, form)? {
        Submission::Accepted(form) => form,
        Submission::Rejected(form, errors) => {
            return Ok(FormView::new(&state.signer, &user, &uri, form)
                .with_errors(errors)
                .into_response())
        }
    };

    let class = CsClass::create(&state.db, &form.class_name).await?;
    tracing::info!(class_id = class.id, user_id = user.user_id, "Class created");

    Ok(to_index())
}

/// `GET /classes/add_student/{class_id}`
///
/// Pre-filled from the caller's current enrollment, if any.
pub async fn add_student_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path(class_id): Path<i64>,
) -> ApiResult<Response> {
    if CsClass::find_by_id(&state.db, class_id).await?.is_none() {
        return Ok(to_index());
    }

    let values = Student::find_enrollment(&state.db, &user.email, class_id)
        .await?
        .map(|s| StudentForm {
            student_name: s.student_name,
            year: s.year,
            formkey: None,
        })
        .unwrap_or_default();

    Ok(FormView::new(&state.signer, &user, &uri, values).into_response())
}

/// `POST /classes/add_student/{class_id}`
pub async fn add_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    Path(class_id): Path<i64>,
    Form(form): Form<StudentForm>,
) -> ApiResult<Response> {
    if CsClass::find_by_id(&state.db, class_id).await?.is_none() {
        tracing::debug!(class_id, "Class not found");
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

    let student = Student::enroll(
        &state.db,
        Enroll {
            class_id,
            student_name: form.student_name,
            year: form.year,
            student_email: user.email.clone(),
        },
    )
    .await?;

    tracing::info!(student_id = student.id, class_id, user_id = user.user_id, "Student enrolled");
    Ok(to_index())
}

/// `GET|POST /classes/remove_student/{class_id}` (signed)
pub async fn remove_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(class_id): Path<i64>,
) -> ApiResult<Response> {
    if Student::unenroll(&state.db, &user.email, class_id).await? {
        tracing::info!(class_id, user_id = user.user_id, "Student unenrolled");
    }

    Ok(to_index())
}
