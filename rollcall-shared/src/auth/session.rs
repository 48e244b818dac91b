/// Session tokens
///
/// A session is an HS256 JWT issued at login and carried in the
/// `rollcall_session` cookie (or an `Authorization: Bearer` header). Besides
/// the user id and email it holds a random session id, `sid`, which the URL
/// signer mixes into every capability token so links minted for one session
/// are worthless in another.
///
/// # Example
///
/// ```
/// use rollcall_shared::auth::session::{issue_session_token, validate_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = SessionClaims::new(42, "jane@example.com");
/// let token = issue_session_token(&claims, "test-secret-key-at-least-32-bytes-long")?;
///
/// let validated = validate_session_token(&token, "test-secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, 42);
/// assert_eq!(validated.email, "jane@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every session token
pub const ISSUER: &str = "rollcall";

/// Session lifetime when none is configured
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to issue session token: {0}")]
    IssueError(String),

    #[error("Session has expired")]
    Expired,

    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: i64,

    /// Lowercased user email, the identity owner checks compare against
    pub email: String,

    /// Random per-login session id
    pub sid: Uuid,

    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for a fresh session with the default lifetime
    pub fn new(user_id: i64, email: impl Into<String>) -> Self {
        Self::with_ttl(user_id, email, Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    /// Claims for a fresh session expiring after `ttl`
    pub fn with_ttl(user_id: i64, email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email: email.into(),
            sid: Uuid::new_v4(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds until expiry, zero once expired
    pub fn max_age_seconds(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Signs `claims` with HS256
pub fn issue_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::IssueError(e.to_string()))
}

/// Verifies signature, issuer, `exp` and `nbf`, and returns the claims
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;
    validation.leeway = 0;

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = SessionClaims::new(7, "user@example.com");

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert!(!claims.is_expired());
        assert!(claims.max_age_seconds() > 0);
    }

    #[test]
    fn test_every_session_gets_its_own_sid() {
        let first = SessionClaims::new(7, "user@example.com");
        let second = SessionClaims::new(7, "user@example.com");
        assert_ne!(first.sid, second.sid);
    }

    #[test]
    fn test_issue_and_validate() {
        let claims = SessionClaims::new(7, "user@example.com");
        let token = issue_session_token(&claims, SECRET).unwrap();

        let validated = validate_session_token(&token, SECRET).unwrap();
        assert_eq!(validated, claims);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = SessionClaims::new(7, "user@example.com");
        let token = issue_session_token(&claims, SECRET).unwrap();

        let result = validate_session_token(&token, "another-secret-key-of-32-bytes-long!");
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_session() {
        let claims = SessionClaims::with_ttl(7, "user@example.com", Duration::seconds(-3600));
        assert!(claims.is_expired());
        assert_eq!(claims.max_age_seconds(), 0);

        let token = issue_session_token(&claims, SECRET).unwrap();
        let result = validate_session_token(&token, SECRET);
        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[test]
    fn test_validate_garbage() {
        let result = validate_session_token("not.a.jwt", SECRET);
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }
}
