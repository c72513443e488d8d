//! Path-based authorization.
//!
//! [`PathPolicy::decide`] is the single decision point for every protected
//! request:
//!
//! ```text
//! exempt path ───────────────────────────────► Allowed
//! no valid token ────────────────────────────► Denied
//! admin ─────────────────────────────────────► Allowed
//! user on admin-only path ───────────────────► Forbidden
//! user, no account ── global list (cached) ──► Allowed | Denied
//! user, account ───── account list (cached) ─► Allowed | Denied
//! ```
//!
//! The global list falls back to a safe default when the config store is
//! unreachable. An account's list is authoritative: if it cannot be fetched
//! the request is denied.

use crate::cache::TtlCache;
use crate::config::AuthConfig;
use crate::constants::USER_ALLOWED_PAGES_KEY;
use crate::error::{AuthError, Result};
use crate::providers::{AccountRepository, ConfigStore};
use crate::state::{AccountId, Decision, Identity, Role};
use crate::token::TokenAuthority;
use crate::utils::parse_allow_list;
use carto_core::environment::Clock;
use std::sync::Arc;

/// Allow-list matching rule.
///
/// `path` is allowed by `entry` iff they are equal, or `entry` is not the
/// root and `path` lies under it. The root entry only grants `/` itself.
///
/// # Examples
///
/// ```
/// use carto_auth::policy::path_matches;
///
/// assert!(path_matches("/admin", "/admin"));
/// assert!(path_matches("/admin/x", "/admin"));
/// assert!(!path_matches("/administration", "/admin"));
/// assert!(path_matches("/", "/"));
/// assert!(!path_matches("/maps", "/"));
/// ```
#[must_use]
pub fn path_matches(path: &str, entry: &str) -> bool {
    path == entry
        || (entry != "/"
            && path
                .strip_prefix(entry)
                .is_some_and(|rest| rest.starts_with('/')))
}

/// Returns `true` if any entry of `allow_list` matches `path`.
#[must_use]
pub fn allowed_by<S: AsRef<str>>(allow_list: &[S], path: &str) -> bool {
    allow_list.iter().any(|entry| path_matches(path, entry.as_ref()))
}

/// Decides whether an identity may visit a path.
pub struct PathPolicy<A, C> {
    config: Arc<AuthConfig>,
    accounts: Arc<A>,
    config_store: Arc<C>,
    global_cache: TtlCache<(), Vec<String>>,
    account_cache: TtlCache<AccountId, Vec<String>>,
}

impl<A, C> Clone for PathPolicy<A, C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            accounts: Arc::clone(&self.accounts),
            config_store: Arc::clone(&self.config_store),
            global_cache: self.global_cache.clone(),
            account_cache: self.account_cache.clone(),
        }
    }
}

impl<A, C> std::fmt::Debug for PathPolicy<A, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathPolicy")
            .field("admin_only_prefixes", &self.config.admin_only_prefixes)
            .finish_non_exhaustive()
    }
}

impl<A, C> PathPolicy<A, C>
where
    A: AccountRepository,
    C: ConfigStore,
{
    /// Create a policy with empty caches.
    #[must_use]
    pub fn new(
        config: Arc<AuthConfig>,
        accounts: Arc<A>,
        config_store: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ttl = config.allow_list_ttl;
        Self {
            config,
            accounts,
            config_store,
            global_cache: TtlCache::new(ttl, Arc::clone(&clock)),
            account_cache: TtlCache::new(ttl, clock),
        }
    }

    /// Paths that are always allowed, whoever asks.
    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        self.config.exempt_exact.iter().any(|p| p == path)
            || allowed_by(&self.config.exempt_prefixes, path)
            || self.config.exempt_suffixes.iter().any(|s| path.ends_with(s.as_str()))
    }

    /// Paths reserved for the admin role.
    #[must_use]
    pub fn is_admin_only(&self, path: &str) -> bool {
        allowed_by(&self.config.admin_only_prefixes, path)
    }

    /// Decide whether `identity` may visit `path`.
    ///
    /// `None` means the request carried no valid token. Never fails: fetch
    /// errors resolve to [`Decision::Denied`].
    #[tracing::instrument(skip(self), fields(role = identity.map(|i| i.role.as_str())))]
    pub async fn decide(&self, identity: Option<&Identity>, path: &str) -> Decision {
        let decision = self.evaluate(identity, path).await;

        metrics::counter!("auth.policy.decision", "outcome" => decision.as_str()).increment(1);
        match decision {
            Decision::Allowed => tracing::trace!("Path allowed"),
            Decision::Denied => tracing::debug!("Path denied"),
            Decision::Forbidden => tracing::warn!("Admin-only path refused to user session"),
        }

        decision
    }

    /// Verify the request's token and decide in one step.
    ///
    /// An invalid token counts as no token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unconfigured`] for a protected path when the
    /// authority has no secret, with or without a token. The caller answers
    /// with a server error rather than a redirect.
    pub async fn authorize(
        &self,
        tokens: &TokenAuthority,
        token: Option<&str>,
        path: &str,
    ) -> Result<(Decision, Option<Identity>)> {
        if self.is_exempt(path) {
            return Ok((Decision::Allowed, None));
        }
        if !tokens.is_configured() {
            return Err(AuthError::Unconfigured);
        }

        let identity = match token.map(|t| tokens.verify(t)) {
            Some(Ok(identity)) => Some(identity),
            Some(Err(AuthError::Unconfigured)) => return Err(AuthError::Unconfigured),
            Some(Err(_)) | None => None,
        };

        let decision = self.decide(identity.as_ref(), path).await;
        Ok((decision, identity))
    }

    /// The allow-list that governs a user identity.
    ///
    /// # Errors
    ///
    /// Fails only for account sessions whose list cannot be fetched.
    pub async fn allow_list_for(&self, identity: &Identity) -> Result<Vec<String>> {
        match identity.account_id {
            Some(account_id) => self.account_allow_list(account_id).await,
            None => Ok(self.global_allow_list().await),
        }
    }

    async fn evaluate(&self, identity: Option<&Identity>, path: &str) -> Decision {
        if self.is_exempt(path) {
            return Decision::Allowed;
        }

        let Some(identity) = identity else {
            return Decision::Denied;
        };

        if identity.role == Role::Admin {
            return Decision::Allowed;
        }

        if self.is_admin_only(path) {
            return Decision::Forbidden;
        }

        match self.allow_list_for(identity).await {
            Ok(pages) if allowed_by(&pages, path) => Decision::Allowed,
            Ok(_) => Decision::Denied,
            Err(e) => {
                tracing::warn!(
                    account_id = ?identity.account_id,
                    error = %e,
                    "Account allow-list unavailable, denying request"
                );
                Decision::Denied
            },
        }
    }

    /// Global user allow-list. Never fails: the default list stands in for
    /// an absent, unparseable or unreachable stored value.
    async fn global_allow_list(&self) -> Vec<String> {
        let store = Arc::clone(&self.config_store);
        let default = &self.config.default_user_allow_list;

        let fetched = self
            .global_cache
            .get_or_fetch(&(), || async move {
                let raw = store.get(USER_ALLOWED_PAGES_KEY).await?;
                Ok(raw
                    .as_deref()
                    .and_then(parse_allow_list)
                    .unwrap_or_else(|| default.clone()))
            })
            .await;

        match fetched {
            Ok(pages) => {
                metrics::counter!("auth.allow_list.fetch", "scope" => "global", "outcome" => "ok")
                    .increment(1);
                pages
            },
            Err(e) => {
                metrics::counter!("auth.allow_list.fetch", "scope" => "global", "outcome" => "fallback")
                    .increment(1);
                tracing::warn!(error = %e, "Global allow-list unavailable, using default");
                default.clone()
            },
        }
    }

    async fn account_allow_list(&self, account_id: AccountId) -> Result<Vec<String>> {
        let accounts = Arc::clone(&self.accounts);
        let default = &self.config.default_user_allow_list;

        let fetched = self
            .account_cache
            .get_or_fetch(&account_id, || async move {
                let pages = accounts.allowed_pages(account_id).await?;
                Ok(pages.unwrap_or_else(|| default.clone()))
            })
            .await;

        let outcome = if fetched.is_ok() { "ok" } else { "error" };
        metrics::counter!("auth.allow_list.fetch", "scope" => "account", "outcome" => outcome)
            .increment(1);

        fetched
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockAccountRepository, MockConfigStore};
    use carto_testing::ManualClock;

    fn policy() -> PathPolicy<MockAccountRepository, MockConfigStore> {
        PathPolicy::new(
            Arc::new(AuthConfig::new("secret")),
            Arc::new(MockAccountRepository::new()),
            Arc::new(MockConfigStore::new()),
            Arc::new(ManualClock::at_millis(0)),
        )
    }

    #[test]
    fn test_path_matches_rule() {
        assert!(path_matches("/", "/"));
        assert!(!path_matches("/x", "/"));
        assert!(path_matches("/maps", "/maps"));
        assert!(path_matches("/maps/a/b", "/maps"));
        assert!(!path_matches("/mapsx", "/maps"));
        assert!(!path_matches("/map", "/maps"));
        assert!(!path_matches("", "/"));
    }

    #[test]
    fn test_allowed_by_empty_list() {
        assert!(!allowed_by::<String>(&[], "/"));
    }

    #[test]
    fn test_exempt_paths() {
        let policy = policy();
        for path in ["/api", "/api/auth", "/_next/static/x.js", "/auth/callback", "/icons/a.png",
            "/login", "/signup", "/favicon.ico", "/logo.svg", "/deep/path/img.svg"]
        {
            assert!(policy.is_exempt(path), "{path} should be exempt");
        }
        for path in ["/", "/admin", "/login/other", "/apiary", "/maps"] {
            assert!(!policy.is_exempt(path), "{path} should be protected");
        }
    }

    #[test]
    fn test_admin_only() {
        let policy = policy();
        assert!(policy.is_admin_only("/admin"));
        assert!(policy.is_admin_only("/admin/accounts"));
        assert!(!policy.is_admin_only("/administration"));
    }

    #[tokio::test]
    async fn test_no_identity_is_denied() {
        assert_eq!(policy().decide(None, "/").await, Decision::Denied);
        assert_eq!(policy().decide(None, "/login").await, Decision::Allowed);
    }

    #[tokio::test]
    async fn test_admin_allowed_everywhere() {
        let policy = policy();
        for path in ["/", "/admin", "/admin/accounts", "/anything"] {
            assert_eq!(policy.decide(Some(&Identity::admin()), path).await, Decision::Allowed);
        }
    }

    #[tokio::test]
    async fn test_user_default_global_list() {
        let policy = policy();
        let user = Identity::user();
        assert_eq!(policy.decide(Some(&user), "/").await, Decision::Allowed);
        assert_eq!(policy.decide(Some(&user), "/maps").await, Decision::Denied);
        assert_eq!(policy.decide(Some(&user), "/admin").await, Decision::Forbidden);
    }
}
