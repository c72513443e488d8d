//! Account repository trait.

use crate::error::Result;
use crate::state::{Account, AccountId, AccountSummary, NewAccount};
use std::future::Future;

/// Account repository.
///
/// Abstracts over the account table (PostgreSQL in production).
pub trait AccountRepository: Send + Sync {
    /// Get account by login.
    ///
    /// `login` is already normalized. Returns `Ok(None)` when no account
    /// has that login.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_by_login(&self, login: &str) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Login already exists → `AuthError::LoginTaken`
    /// - Database query fails
    fn create(&self, account: NewAccount) -> impl Future<Output = Result<Account>> + Send;

    /// Get an account's allow-list.
    ///
    /// Returns `Ok(None)` when the account exists but has no list stored.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AuthError::AccountNotFound`
    /// - Database query fails
    fn allowed_pages(&self, id: AccountId) -> impl Future<Output = Result<Option<Vec<String>>>> + Send;

    /// Replace an account's allow-list.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AuthError::AccountNotFound`
    /// - Database query fails
    fn set_allowed_pages(
        &self,
        id: AccountId,
        pages: Vec<String>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List all accounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list(&self) -> impl Future<Output = Result<Vec<AccountSummary>>> + Send;
}
