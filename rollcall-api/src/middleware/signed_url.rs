/// Signed URL verification
///
/// Route layer for every route reachable through a signed link. The
/// `_signature` query parameter must be a token the server minted for this
/// exact path and the caller's session; otherwise the request stops here with
/// 403 and the handler never runs.
///
/// Must sit inside the session layer: it reads the `CurrentUser` the session
/// layer inserted. The path is taken from `OriginalUri` because nesting strips
/// the mount prefix from the request URI.

use axum::{
    extract::{OriginalUri, Query, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use rollcall_shared::auth::middleware::CurrentUser;
use serde::Deserialize;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

#[derive(Debug, Default, Deserialize)]
struct SignatureQuery {
    #[serde(rename = "_signature")]
    signature: Option<String>,
}

pub async fn verify_signed_url(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let query = Query::<SignatureQuery>::try_from_uri(&uri)
        .map(|Query(q)| q)
        .unwrap_or_default();

    if let Err(e) = state
        .signer
        .verify(user.session_id, uri.path(), query.signature.as_deref())
    {
        tracing::warn!(
            path = %uri.path(),
            user_id = user.user_id,
            error = %e,
            "Rejected signed URL"
        );
        return Err(ApiError::from(e));
    }

    Ok(next.run(req).await)
}
