//! Admin allow-list management.
//!
//! Every handler needs a valid session (401 otherwise); the admin service
//! refuses non-admin callers (403).

use crate::error::AppError;
use crate::extractors::Caller;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use carto_auth::AccountId;
use carto_auth::constants::ROOT_PATH;
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};
use carto_auth::state::AccountSummary;
use serde::{Deserialize, Serialize};

/// An allow-list.
#[derive(Debug, Clone, Serialize)]
pub struct PagesResponse {
    /// Allowed path prefixes.
    pub pages: Vec<String>,
}

/// Acknowledged allow-list update, echoing the stored (normalized) list.
#[derive(Debug, Clone, Serialize)]
pub struct PagesUpdated {
    /// Always `true`.
    pub ok: bool,

    /// The list as stored.
    pub pages: Vec<String>,
}

/// Allow-list update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesRequest {
    /// New list. Missing means `["/"]`.
    #[serde(default)]
    pub pages: Option<Vec<String>>,
}

impl PagesRequest {
    fn into_pages(self) -> Vec<String> {
        self.pages.unwrap_or_else(|| vec![ROOT_PATH.to_string()])
    }
}

/// Registered accounts, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct AccountsResponse {
    /// Accounts without password hashes.
    pub accounts: Vec<AccountSummary>,
}

/// `GET /api/admin/pages`: the global user allow-list.
///
/// # Errors
///
/// 401 without a session, 403 for non-admins.
pub async fn global_pages<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Caller(caller): Caller,
) -> Result<Json<PagesResponse>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let pages = state.auth.admin().global_allow_list(&caller).await?;
    Ok(Json(PagesResponse { pages }))
}

/// `POST /api/admin/pages`: replace the global user allow-list.
///
/// Sessions see the change once their cached copy expires.
///
/// # Errors
///
/// 401 without a session, 403 for non-admins.
pub async fn set_global_pages<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Caller(caller): Caller,
    Json(request): Json<PagesRequest>,
) -> Result<Json<PagesUpdated>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let pages = state
        .auth
        .admin()
        .set_global_allow_list(&caller, request.into_pages())
        .await?;
    Ok(Json(PagesUpdated { ok: true, pages }))
}

/// `GET /api/admin/accounts`.
///
/// # Errors
///
/// 401 without a session, 403 for non-admins.
pub async fn list_accounts<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Caller(caller): Caller,
) -> Result<Json<AccountsResponse>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let accounts = state.auth.admin().list_accounts(&caller).await?;
    Ok(Json(AccountsResponse { accounts }))
}

/// `GET /api/admin/accounts/:id/pages`.
///
/// # Errors
///
/// 401 without a session, 403 for non-admins, 404 for an unknown account.
pub async fn account_pages<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<PagesResponse>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let pages = state
        .auth
        .admin()
        .account_allow_list(&caller, parse_account_id(&id)?)
        .await?;
    Ok(Json(PagesResponse { pages }))
}

/// `POST /api/admin/accounts/:id/pages`.
///
/// # Errors
///
/// 401 without a session, 403 for non-admins, 404 for an unknown account.
pub async fn set_account_pages<A, C, H>(
    State(state): State<AppState<A, C, H>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(request): Json<PagesRequest>,
) -> Result<Json<PagesUpdated>, AppError>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let pages = state
        .auth
        .admin()
        .set_account_allow_list(&caller, parse_account_id(&id)?, request.into_pages())
        .await?;
    Ok(Json(PagesUpdated { ok: true, pages }))
}

fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found("Account not found"))
}
