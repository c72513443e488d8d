//! Admin allow-list management.
//!
//! Every operation takes the caller's identity and refuses non-admins with
//! [`AuthError::Forbidden`]. Writes are not pushed into the policy caches;
//! they take effect once the cached lists age out.

use crate::config::AuthConfig;
use crate::constants::USER_ALLOWED_PAGES_KEY;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{AccountRepository, ConfigStore, PasswordHasher};
use crate::state::{AccountId, AccountSummary, Identity};
use crate::utils::{normalize_pages, parse_allow_list};
use std::sync::Arc;

/// Admin-only operations.
pub struct AdminService<A, C> {
    config: Arc<AuthConfig>,
    accounts: Arc<A>,
    config_store: Arc<C>,
}

impl<A, C> AdminService<A, C>
where
    A: AccountRepository,
    C: ConfigStore,
{
    /// Create an admin service.
    #[must_use]
    pub fn new<H: PasswordHasher>(config: Arc<AuthConfig>, env: &AuthEnvironment<A, C, H>) -> Self {
        Self {
            config,
            accounts: Arc::clone(&env.accounts),
            config_store: Arc::clone(&env.config_store),
        }
    }

    /// The global user allow-list as stored, or the default list when it
    /// is absent or unparseable.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] for non-admins
    /// - store errors
    pub async fn global_allow_list(&self, caller: &Identity) -> Result<Vec<String>> {
        require_admin(caller, "global allow-list")?;

        let raw = self.config_store.get(USER_ALLOWED_PAGES_KEY).await?;
        Ok(raw
            .as_deref()
            .and_then(parse_allow_list)
            .unwrap_or_else(|| self.config.default_user_allow_list.clone()))
    }

    /// Replace the global user allow-list. Returns the normalized list.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] for non-admins
    /// - store errors
    pub async fn set_global_allow_list(&self, caller: &Identity, pages: Vec<String>) -> Result<Vec<String>> {
        require_admin(caller, "global allow-list")?;

        let pages = normalize_pages(pages);
        let encoded = serde_json::to_string(&pages)
            .map_err(|e| AuthError::InternalError(format!("Allow-list encoding failed: {e}")))?;
        self.config_store.set(USER_ALLOWED_PAGES_KEY, encoded).await?;

        tracing::info!(pages = ?pages, "Global allow-list updated");
        Ok(pages)
    }

    /// All accounts, newest first.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] for non-admins
    /// - store errors
    pub async fn list_accounts(&self, caller: &Identity) -> Result<Vec<AccountSummary>> {
        require_admin(caller, "accounts")?;
        self.accounts.list().await
    }

    /// An account's allow-list, or the default list when none is stored.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] for non-admins
    /// - [`AuthError::AccountNotFound`] when the account does not exist
    pub async fn account_allow_list(&self, caller: &Identity, id: AccountId) -> Result<Vec<String>> {
        require_admin(caller, "account allow-list")?;

        let pages = self.accounts.allowed_pages(id).await?;
        Ok(pages.unwrap_or_else(|| self.config.default_user_allow_list.clone()))
    }

    /// Replace an account's allow-list. Returns the normalized list.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] for non-admins
    /// - [`AuthError::AccountNotFound`] when the account does not exist
    pub async fn set_account_allow_list(
        &self,
        caller: &Identity,
        id: AccountId,
        pages: Vec<String>,
    ) -> Result<Vec<String>> {
        require_admin(caller, "account allow-list")?;

        let pages = normalize_pages(pages);
        self.accounts.set_allowed_pages(id, pages.clone()).await?;

        tracing::info!(account_id = %id, pages = ?pages, "Account allow-list updated");
        Ok(pages)
    }
}

fn require_admin(caller: &Identity, operation: &str) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        tracing::warn!(operation, "Non-admin attempted an admin operation");
        Err(AuthError::Forbidden {
            path: operation.to_string(),
        })
    }
}
