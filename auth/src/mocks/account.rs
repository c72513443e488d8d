//! Mock account repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::AccountRepository;
use crate::state::{Account, AccountId, AccountSummary, NewAccount};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock account repository.
///
/// Uses in-memory storage; accounts are kept in insertion order.
#[derive(Debug, Clone)]
pub struct MockAccountRepository {
    accounts: Arc<Mutex<Vec<Account>>>,
    unavailable: Arc<AtomicBool>,
    page_fetches: Arc<AtomicUsize>,
}

impl MockAccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(Vec::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
            page_fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every call fail with a `RemoteFetchError` (simulated outage).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `allowed_pages` calls that reached the store.
    #[must_use]
    pub fn page_fetch_count(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    /// Insert an account directly, bypassing validation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the lock is poisoned.
    pub fn insert(&self, account: Account) -> Result<()> {
        lock(&self.accounts)?.push(account);
        Ok(())
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::RemoteFetchError("account store unavailable".into()));
        }
        Ok(())
    }
}

impl Default for MockAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(accounts: &Mutex<Vec<Account>>) -> Result<std::sync::MutexGuard<'_, Vec<Account>>> {
    accounts
        .lock()
        .map_err(|_| AuthError::InternalError("Mutex lock failed".into()))
}

impl AccountRepository for MockAccountRepository {
    fn find_by_login(&self, login: &str) -> impl Future<Output = Result<Option<Account>>> + Send {
        let result = self.check_available().and_then(|()| {
            Ok(lock(&self.accounts)?
                .iter()
                .find(|a| a.login == login)
                .cloned())
        });

        async move { result }
    }

    fn create(&self, account: NewAccount) -> impl Future<Output = Result<Account>> + Send {
        let result = self.check_available().and_then(|()| {
            let mut accounts = lock(&self.accounts)?;
            if accounts.iter().any(|a| a.login == account.login) {
                return Err(AuthError::LoginTaken);
            }

            let created = Account {
                id: AccountId::new(),
                login: account.login,
                password_hash: account.password_hash,
                allowed_pages: account.allowed_pages,
                created_at: account.created_at,
            };
            accounts.push(created.clone());
            Ok(created)
        });

        async move { result }
    }

    fn allowed_pages(&self, id: AccountId) -> impl Future<Output = Result<Option<Vec<String>>>> + Send {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);

        let result = self.check_available().and_then(|()| {
            lock(&self.accounts)?
                .iter()
                .find(|a| a.id == id)
                .map(|a| Some(a.allowed_pages.clone()))
                .ok_or(AuthError::AccountNotFound)
        });

        async move { result }
    }

    fn set_allowed_pages(
        &self,
        id: AccountId,
        pages: Vec<String>,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.check_available().and_then(|()| {
            let mut accounts = lock(&self.accounts)?;
            let account = accounts
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(AuthError::AccountNotFound)?;
            account.allowed_pages = pages;
            Ok(())
        });

        async move { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<AccountSummary>>> + Send {
        let result = self.check_available().and_then(|()| {
            let mut summaries: Vec<AccountSummary> =
                lock(&self.accounts)?.iter().rev().map(Account::summary).collect();
            // Stable sort keeps later insertions first among equal timestamps.
            summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(summaries)
        });

        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use carto_testing::test_clock;
    use carto_core::environment::Clock;
    use chrono::{DateTime, Duration, Utc};

    fn new_account_at(login: &str, created_at: DateTime<Utc>) -> NewAccount {
        NewAccount {
            login: login.to_string(),
            password_hash: "hash".to_string(),
            allowed_pages: vec!["/".to_string()],
            created_at,
        }
    }

    fn new_account(login: &str) -> NewAccount {
        new_account_at(login, test_clock().now())
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MockAccountRepository::new();
        let created = repo.create(new_account("alice")).await.unwrap();

        let found = repo.find_by_login("alice").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.find_by_login("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login() {
        let repo = MockAccountRepository::new();
        repo.create(new_account("alice")).await.unwrap();
        assert_eq!(repo.create(new_account("alice")).await, Err(AuthError::LoginTaken));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = MockAccountRepository::new();
        let start = test_clock().now();

        repo.create(new_account_at("second", start + Duration::seconds(1))).await.unwrap();
        repo.create(new_account_at("first", start)).await.unwrap();
        repo.create(new_account_at("third", start + Duration::seconds(1))).await.unwrap();

        let logins: Vec<String> = repo.list().await.unwrap().into_iter().map(|a| a.login).collect();
        assert_eq!(logins, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_unavailable_and_counter() {
        let repo = MockAccountRepository::new();
        let account = repo.create(new_account("alice")).await.unwrap();

        assert_eq!(repo.allowed_pages(account.id).await.unwrap(), Some(vec!["/".into()]));
        repo.set_unavailable(true);
        assert!(matches!(
            repo.allowed_pages(account.id).await,
            Err(AuthError::RemoteFetchError(_))
        ));
        assert_eq!(repo.page_fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_account() {
        let repo = MockAccountRepository::new();
        let id = AccountId::new();
        assert_eq!(repo.allowed_pages(id).await, Err(AuthError::AccountNotFound));
        assert_eq!(repo.set_allowed_pages(id, vec![]).await, Err(AuthError::AccountNotFound));
    }
}
