//! The auth gate in front of every page.
//!
//! # Flow
//!
//! 1. Exempt paths (API, framework assets, login, icons, `.svg`) pass through.
//! 2. The session cookie is verified; a bad token counts as no token.
//! 3. The path policy decides:
//!    - **Allowed**: the request continues with the [`Identity`] in its
//!      extensions (absent for exempt paths)
//!    - **Denied**: redirect to the login page with `returnUrl`
//!    - **Forbidden**: same redirect plus `forbidden=1`
//! 4. Without a signing secret, protected paths answer 500.
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .fallback_service(ServeDir::new("public"))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), auth_gate));
//! ```
//!
//! [`Identity`]: carto_auth::Identity

use crate::error::AppError;
use crate::extractors::SessionCookie;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use carto_auth::Decision;
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};

/// Gate middleware; install with [`axum::middleware::from_fn_with_state`].
pub async fn auth_gate<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    mut request: Request,
    next: Next,
) -> Response
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let path = request.uri().path().to_owned();
    let auth = &state.auth;

    let cookie = SessionCookie::from_headers(request.headers(), &auth.config().cookie.name);

    let (decision, identity) = match auth.policy().authorize(auth.tokens(), cookie.token(), &path).await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(path = %path, %error, "Protected path requested without auth configured");
            return AppError::from(error).into_response();
        },
    };

    if let Some(location) = decision.redirect_location(&auth.config().login_path, &path) {
        metrics::counter!("web.gate.redirect", "decision" => decision.as_str()).increment(1);
        if decision == Decision::Forbidden {
            tracing::warn!(path = %path, "Forbidden path, redirecting to login");
        } else {
            tracing::debug!(path = %path, "Unauthenticated, redirecting to login");
        }
        return Redirect::temporary(&location).into_response();
    }

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }
    next.run(request).await
}
