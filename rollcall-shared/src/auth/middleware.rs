/// Session authentication
///
/// The API's session layer reads the session token from the `rollcall_session`
/// cookie, falling back to `Authorization: Bearer <token>`, validates it and
/// inserts a [`CurrentUser`] into the request extensions. Handlers receive the
/// caller as an injected value instead of consulting global state, which is
/// what makes owner checks testable on their own.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use rollcall_shared::auth::middleware::authenticate;
/// use rollcall_shared::auth::session::{issue_session_token, SessionClaims};
///
/// let secret = "a-session-secret-that-is-32-bytes!!";
/// let token = issue_session_token(&SessionClaims::new(1, "jane@example.com"), secret).unwrap();
///
/// let mut headers = HeaderMap::new();
/// let cookie = format!("rollcall_session={}", token);
/// headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
///
/// let user = authenticate(&headers, secret).unwrap();
/// assert_eq!(user.email, "jane@example.com");
/// ```

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use super::session::{validate_session_token, SessionClaims, SessionError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "rollcall_session";

/// Authenticated caller, available to handlers as `Extension<CurrentUser>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,

    /// Lowercased email; compared against `contacts.user_email` and
    /// `students.student_email`
    pub email: String,

    /// Per-login session id that capability tokens are bound to
    pub session_id: Uuid,
}

impl CurrentUser {
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            session_id: claims.sid,
        }
    }
}

/// Error type for the session layer
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing session")]
    MissingSession,

    #[error("Session expired")]
    Expired,

    #[error("Invalid session: {0}")]
    InvalidSession(String),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => AuthError::Expired,
            other => AuthError::InvalidSession(other.to_string()),
        }
    }
}

/// Finds the session token in the cookie header or a bearer header
///
/// The cookie wins when both are present.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Resolves the caller from request headers
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<CurrentUser, AuthError> {
    let token = session_token_from_headers(headers).ok_or(AuthError::MissingSession)?;
    let claims = validate_session_token(&token, secret)?;

    Ok(CurrentUser::from_claims(&claims))
}
