/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use rollcall_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    middleware::{security::SecurityHeadersLayer, signed_url::verify_signed_url},
    routes::{self, paths},
};
use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, Next},
    response::{Redirect, Response},
    routing::{get, post},
    Router,
};
use rollcall_shared::auth::{
    middleware::{authenticate, CurrentUser},
    url_signer::UrlSigner,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,

    /// Mints and checks link signatures and form keys
    pub signer: UrlSigner,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let mut signer = UrlSigner::new(&config.session.secret);
        if let Some(minutes) = config.session.signed_url_ttl_minutes {
            signer = signer.with_ttl(chrono::Duration::minutes(minutes));
        }

        Self {
            db,
            config: Arc::new(config),
            signer,
        }
    }

    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    /// Signed link to `path` for the caller's session
    pub fn signed_url(&self, user: &CurrentUser, path: &str) -> String {
        self.signer.signed_url(user.session_id, path)
    }
}

/// Builds the complete router
///
/// ```text
/// /                                   -> redirect to /contacts/index
/// /health                             (public)
/// /auth/register, /login, /logout     (public)
/// /contacts/                          (session required)
///     index, add_contact, add_phone/{id}
///     edit_contact/{id}               (signed)
///     delete_contact/{id}             (signed)
///     edit_phone/{id}                 (signed)
///     edit_phone/{id}/{phone_id}      (signed)
///     delete_phone/{id}/{phone_id}    (signed)
/// /classes/                           (session required)
///     index, add_class, add_student/{class_id}
///     remove_student/{class_id}       (signed)
/// ```
///
/// The session layer wraps the signature layer, so a signed route sees an
/// authenticated caller before its token is checked.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to(paths::CONTACTS_INDEX) }))
        .route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", get(routes::auth::logout).post(routes::auth::logout));

    let signed_contact_routes = Router::new()
        .route(
            "/edit_contact/:id",
            get(routes::contacts::edit_contact_form).post(routes::contacts::edit_contact),
        )
        .route(
            "/delete_contact/:id",
            get(routes::contacts::delete_contact).post(routes::contacts::delete_contact),
        )
        .route(
            "/edit_phone/:id",
            get(routes::phones::list_phones).post(routes::phones::list_phones),
        )
        .route(
            "/edit_phone/:id/:phone_id",
            get(routes::phones::edit_phone_form).post(routes::phones::edit_phone),
        )
        .route(
            "/delete_phone/:id/:phone_id",
            get(routes::phones::delete_phone).post(routes::phones::delete_phone),
        )
        .route_layer(from_fn_with_state(state.clone(), verify_signed_url));

    let contact_routes = Router::new()
        .route("/index", get(routes::contacts::index))
        .route(
            "/add_contact",
            get(routes::contacts::add_contact_form).post(routes::contacts::add_contact),
        )
        .route(
            "/add_phone/:id",
            get(routes::phones::add_phone_form).post(routes::phones::add_phone),
        )
        .merge(signed_contact_routes)
        .route_layer(from_fn_with_state(state.clone(), session_layer));

    let signed_class_routes = Router::new()
        .route(
            "/remove_student/:class_id",
            get(routes::classes::remove_student).post(routes::classes::remove_student),
        )
        .route_layer(from_fn_with_state(state.clone(), verify_signed_url));

    let class_routes = Router::new()
        .route("/index", get(routes::classes::index))
        .route(
            "/add_class",
            get(routes::classes::add_class_form).post(routes::classes::add_class),
        )
        .route(
            "/add_student/:class_id",
            get(routes::classes::add_student_form).post(routes::classes::add_student),
        )
        .merge(signed_class_routes)
        .route_layer(from_fn_with_state(state.clone(), session_layer));

    Router::new()
        .merge(public_routes)
        .nest("/auth", auth_routes)
        .nest("/contacts", contact_routes)
        .nest("/classes", class_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session layer
///
/// Resolves the caller from the session cookie or bearer header and injects
/// a `CurrentUser` into request extensions.
async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let user = authenticate(req.headers(), state.session_secret()).map_err(|e| {
        tracing::debug!(path = %req.uri().path(), error = %e, "Request without a valid session");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
