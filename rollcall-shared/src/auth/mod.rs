/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`session`]: Signed session tokens (HS256 JWT) carried in a cookie
/// - [`url_signer`]: HMAC capability tokens for mutating links and form keys
/// - [`middleware`]: Session extraction and the `CurrentUser` request context
/// - [`ownership`]: Owner checks for contacts and their phones
///
/// # Example
///
/// ```
/// use rollcall_shared::auth::session::{issue_session_token, validate_session_token, SessionClaims};
/// use rollcall_shared::auth::url_signer::UrlSigner;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-session-secret-that-is-32-bytes!!";
/// let claims = SessionClaims::new(1, "jane@example.com");
/// let token = issue_session_token(&claims, secret)?;
/// let claims = validate_session_token(&token, secret)?;
///
/// let signer = UrlSigner::new(secret);
/// let link = signer.signed_url(claims.sid, "/contacts/delete_contact/3");
/// assert!(link.starts_with("/contacts/delete_contact/3?_signature="));
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod ownership;
pub mod password;
pub mod session;
pub mod url_signer;
