/// Capability tokens for links and forms
///
/// Mutating routes reachable by a plain GET (delete links, edit pages) carry a
/// server-issued signature in the `_signature` query parameter. The token is
/// an HMAC-SHA256 over the session id, the request path and an expiry, so it
/// proves the server minted this exact link for this exact session.
///
/// # Token Format
///
/// ```text
/// {expires}.{hex hmac}
/// ```
///
/// `expires` is a unix timestamp, or `0` when the signer has no lifetime
/// configured (the link then lives as long as the session).
///
/// Form keys use the same construction over `"form:" + action path`.
///
/// # Example
///
/// ```
/// use rollcall_shared::auth::url_signer::UrlSigner;
/// use uuid::Uuid;
///
/// let signer = UrlSigner::new("a-session-secret-that-is-32-bytes!!");
/// let session = Uuid::new_v4();
///
/// let token = signer.sign(session, "/contacts/delete_contact/3");
/// assert!(signer.verify(session, "/contacts/delete_contact/3", Some(&token)).is_ok());
/// assert!(signer.verify(session, "/contacts/delete_contact/4", Some(&token)).is_err());
/// assert!(signer.verify(Uuid::new_v4(), "/contacts/delete_contact/3", Some(&token)).is_err());
/// ```

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying a link signature
pub const SIGNATURE_PARAM: &str = "_signature";

/// Form field carrying a form key
pub const FORM_KEY_FIELD: &str = "_formkey";

/// Why a signature was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Missing signature")]
    Missing,

    #[error("Malformed signature")]
    Malformed,

    #[error("Signature has expired")]
    Expired,

    #[error("Invalid signature")]
    Invalid,
}

/// HMAC signer bound to the server secret
#[derive(Clone)]
pub struct UrlSigner {
    key: Vec<u8>,
    ttl: Option<Duration>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Signer whose tokens never expire on their own
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            ttl: None,
        }
    }

    /// Limits every token minted from now on to `ttl`
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Token for `path` within `session_id`
    pub fn sign(&self, session_id: Uuid, path: &str) -> String {
        let expires = self
            .ttl
            .map(|ttl| (Utc::now() + ttl).timestamp())
            .unwrap_or(0);

        self.sign_with_expiry(session_id, path, expires)
    }

    /// `path` with its signature appended as a query parameter
    pub fn signed_url(&self, session_id: Uuid, path: &str) -> String {
        format!("{}?{}={}", path, SIGNATURE_PARAM, self.sign(session_id, path))
    }

    /// Checks a token presented for `path` in `session_id`
    ///
    /// The MAC comparison runs in constant time.
    pub fn verify(
        &self,
        session_id: Uuid,
        path: &str,
        token: Option<&str>,
    ) -> Result<(), SignatureError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(SignatureError::Missing)?;

        let (expires, signature) = token.split_once('.').ok_or(SignatureError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| SignatureError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| SignatureError::Malformed)?;

        if expires != 0 && Utc::now().timestamp() > expires {
            return Err(SignatureError::Expired);
        }

        self.mac(session_id, path, expires)
            .verify_slice(&signature)
            .map_err(|_| SignatureError::Invalid)
    }

    /// Form key for a form posting to `action_path`
    pub fn form_key(&self, session_id: Uuid, action_path: &str) -> String {
        self.sign(session_id, &form_scope(action_path))
    }

    /// Checks a submitted form key
    pub fn verify_form_key(
        &self,
        session_id: Uuid,
        action_path: &str,
        key: Option<&str>,
    ) -> Result<(), SignatureError> {
        self.verify(session_id, &form_scope(action_path), key)
    }

    fn sign_with_expiry(&self, session_id: Uuid, path: &str, expires: i64) -> String {
        let signature = self.mac(session_id, path, expires).finalize().into_bytes();
        format!("{}.{}", expires, hex::encode(signature))
    }

    fn mac(&self, session_id: Uuid, path: &str, expires: i64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(session_id.as_bytes());
        mac.update(b"|");
        mac.update(path.as_bytes());
        mac.update(b"|");
        mac.update(expires.to_string().as_bytes());
        mac
    }
}

fn form_scope(action_path: &str) -> String {
    format!("form:{}", action_path)
}
