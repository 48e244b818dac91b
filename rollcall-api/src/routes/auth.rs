/// Authentication endpoints
///
/// - `POST /auth/register`: Create an account and start a session
/// - `POST /auth/login`: Start a session
/// - `GET|POST /auth/logout`: Clear the session cookie
///
/// Register and login take urlencoded forms and answer with JSON plus a
/// `Set-Cookie` for the session. The cookie is what the contact and class
/// pages authenticate with; the token in the body serves bearer clients.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    forms::validate_or_reject,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Duration;
use rollcall_shared::{
    auth::{
        middleware::SESSION_COOKIE,
        password,
        session::{issue_session_token, SessionClaims},
    },
    models::user::{normalize_email, CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Body returned when a session starts
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub email: String,
    pub session_token: String,
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Invalid email or short password
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    let form = RegisterForm {
        email: normalize_email(&form.email),
        name: form
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        ..form
    };
    validate_or_reject(&form)?;

    let password_hash = password::hash_password(&form.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: form.email,
            password_hash,
            name: form.name,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    let response = start_session(&state, &user)?;
    Ok((StatusCode::CREATED, response).into_response())
}

/// Log in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let form = LoginForm {
        email: normalize_email(&form.email),
        ..form
    };
    validate_or_reject(&form)?;

    let user = User::find_by_email(&state.db, &form.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&form.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Failed login attempt");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    start_session(&state, &user)
}

/// Clears the session cookie and returns to the start page
///
/// Session tokens are stateless: a copy of the token kept elsewhere stays
/// valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.config.api.production))],
        Redirect::to("/"),
    )
}

fn start_session(state: &AppState, user: &User) -> ApiResult<Response> {
    let claims = SessionClaims::with_ttl(
        user.id,
        user.email.clone(),
        Duration::hours(state.config.session.ttl_hours),
    );
    let token = issue_session_token(&claims, state.session_secret())?;
    let cookie = session_cookie(&token, claims.max_age_seconds(), state.config.api.production);

    let body = Json(SessionResponse {
        user_id: user.id,
        email: user.email.clone(),
        session_token: token,
    });

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie() {
        let cookie = session_cookie("abc", 3600, false);
        assert_eq!(
            cookie,
            "rollcall_session=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600"
        );
        assert!(session_cookie("abc", 3600, true).ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("rollcall_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_register_form_validation() {
        let form = RegisterForm {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: None,
        };
        let err = validate_or_reject(&form).unwrap_err();
        match err {
            ApiError::ValidationError(details) => {
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_register_email_is_capped_at_column_width() {
        let form = RegisterForm {
            email: format!("{}@{}.com", "a".repeat(64), "b".repeat(200)),
            password: "long enough".to_string(),
            name: None,
        };
        match validate_or_reject(&form).unwrap_err() {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "email"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
