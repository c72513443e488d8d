//! The caller's own account.

use crate::error::AppError;
use crate::extractors::Caller;
use crate::state::AppState;
use axum::{Json, extract::State};
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};
use serde::Serialize;

/// Pages the caller's account may open.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedPagesResponse {
    /// Allowed path prefixes.
    pub allowed_pages: Vec<String>,
}

/// `GET /api/account/allowed-pages`.
///
/// The canvas uses this to filter its page list. Sessions that are not
/// tied to an account get 404, which clients read as "no restriction".
///
/// # Errors
///
/// 401 without a session, 404 for admin and shared-password sessions.
pub async fn allowed_pages<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Caller(caller): Caller,
) -> Result<Json<AllowedPagesResponse>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let allowed_pages = state.auth.sessions().allowed_pages(&caller).await?;
    Ok(Json(AllowedPagesResponse { allowed_pages }))
}
