//! Router composition.

use crate::handlers::{account, admin, health, session};
use crate::middleware::auth_gate;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// `pages` serves everything outside `/api` (the built frontend in
/// production). The auth gate wraps both, so pages are only reached by
/// requests the path policy allows.
///
/// # Routes
///
/// ## Session
/// - `GET /api/auth` - password requirement and current role
/// - `POST /api/auth` - log in, set the session cookie
/// - `GET /api/auth/logout` - clear the cookie, redirect to login
/// - `POST /api/auth/register` - create an account
///
/// ## Admin
/// - `GET|POST /api/admin/pages` - global user allow-list
/// - `GET /api/admin/accounts` - registered accounts
/// - `GET|POST /api/admin/accounts/:id/pages` - per-account allow-list
///
/// ## Account
/// - `GET /api/account/allowed-pages` - the caller's own allow-list
///
/// # Example
///
/// ```rust,ignore
/// let pages = Router::new().fallback_service(ServeDir::new("public"));
/// let app = router(AppState::new(auth), pages);
/// axum::serve(listener, app).await?;
/// ```
pub fn router<A, C, H>(state: AppState<A, C, H>, pages: Router) -> Router
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let api = Router::new()
        // Session
        .route(
            "/api/auth",
            get(session::status::<A, C, H>).post(session::login::<A, C, H>),
        )
        .route("/api/auth/logout", get(session::logout::<A, C, H>))
        .route("/api/auth/register", post(session::register::<A, C, H>))
        // Admin
        .route(
            "/api/admin/pages",
            get(admin::global_pages::<A, C, H>).post(admin::set_global_pages::<A, C, H>),
        )
        .route("/api/admin/accounts", get(admin::list_accounts::<A, C, H>))
        .route(
            "/api/admin/accounts/:id/pages",
            get(admin::account_pages::<A, C, H>).post(admin::set_account_pages::<A, C, H>),
        )
        // Account
        .route("/api/account/allowed-pages", get(account::allowed_pages::<A, C, H>))
        .route("/api/health", get(health::health_check))
        .with_state(state.clone());

    api.merge(pages)
        .layer(middleware::from_fn_with_state(state, auth_gate::<A, C, H>))
        .layer(TraceLayer::new_for_http())
}
