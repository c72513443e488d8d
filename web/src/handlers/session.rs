//! Login, status, logout and self-registration.

use crate::error::AppError;
use crate::extractors::SessionCookie;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use carto_auth::cookie::{clear_session_cookie, session_cookie};
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};
use carto_auth::{LoginRequest, Role, SessionStatus};
use serde::{Deserialize, Serialize};

/// Response after a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Always `true`.
    pub ok: bool,

    /// Role of the new session.
    pub role: Role,
}

/// Self-registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    /// Desired login (trimmed and lowercased server-side).
    #[serde(default)]
    pub login: String,

    /// Password, at least six characters.
    #[serde(default)]
    pub password: String,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    /// Always `true`.
    pub ok: bool,
}

/// Log in and set the session cookie.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth
/// Content-Type: application/json
///
/// { "login": "alice", "password": "..." }
/// ```
///
/// Without `login`, the password is tried as the admin password and then
/// the shared user password.
///
/// # Errors
///
/// - 401 for wrong credentials
/// - 500 when auth is not configured
pub async fn login<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let success = state.auth.sessions().login(request).await?;

    let config = state.auth.config();
    let cookie = session_cookie(&config.cookie, &success.token.value, config.session_duration);
    let body = LoginResponse {
        ok: true,
        role: success.identity.role,
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Whether a password is required and who the cookie belongs to.
///
/// # Endpoint
///
/// ```text
/// GET /api/auth
/// ```
///
/// # Response
///
/// ```json
/// { "ok": true, "usePassword": true, "role": "admin" }
/// ```
pub async fn status<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    cookie: SessionCookie,
) -> Json<SessionStatus>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    Json(state.auth.sessions().status(cookie.token()))
}

/// Clear the session cookie and go back to the login page.
///
/// Tokens are stateless; nothing is revoked server-side.
pub async fn logout<A, C, H>(State(state): State<AppState<A, C, H>>) -> Response
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let config = state.auth.config();
    let cookie = clear_session_cookie(&config.cookie);
    tracing::debug!("Session cookie cleared");

    (
        [(header::SET_COOKIE, cookie)],
        Redirect::temporary(&config.login_path),
    )
        .into_response()
}

/// Register an account with the default allow-list.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "login": "alice", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - 400 for a login outside 2..=64 characters or a short password
/// - 409 when the login is taken
pub async fn register<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<OkResponse>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    state
        .auth
        .sessions()
        .register(&request.login, &request.password)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
