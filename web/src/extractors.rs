//! Custom Axum extractors.
//!
//! - [`SessionCookie`]: the raw session token from the `Cookie` header, if any
//! - [`Caller`]: a verified identity, or a 401 rejection
//!
//! API routes sit under the exempt `/api` prefix, so the gate never runs
//! for them; handlers check identity themselves through these extractors.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use carto_auth::Identity;
use carto_auth::cookie::cookie_value;
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};

/// Session token as sent by the browser. Not verified.
#[derive(Debug, Clone, Default)]
pub struct SessionCookie(pub Option<String>);

impl SessionCookie {
    /// Read the named cookie out of the request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, name: &str) -> Self {
        let token = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| cookie_value(value, name))
            .map(str::to_owned);
        Self(token)
    }

    /// The token, if present.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<A, C, H> FromRequestParts<AppState<A, C, H>> for SessionCookie
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<A, C, H>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &state.auth.config().cookie.name))
    }
}

/// The verified identity of the caller.
///
/// Rejects with 401 when the cookie is missing or fails verification, and
/// with 500 when no signing secret is configured.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Identity);

#[async_trait]
impl<A, C, H> FromRequestParts<AppState<A, C, H>> for Caller
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<A, C, H>,
    ) -> Result<Self, Self::Rejection> {
        let cookie = SessionCookie::from_headers(&parts.headers, &state.auth.config().cookie.name);
        let Some(token) = cookie.token() else {
            return Err(AppError::unauthorized("Not signed in"));
        };

        state.auth.tokens().verify(token).map(Self).map_err(AppError::from)
    }
}
