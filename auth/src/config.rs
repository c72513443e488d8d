//! Authentication configuration.
//!
//! Values are supplied by the application (usually through
//! [`AuthConfig::from_env`]); nothing here reads the environment implicitly.

use crate::constants::{LOGIN_PATH, ROOT_PATH, SESSION_COOKIE_NAME, env_vars};
use crate::cookie::SameSitePolicy;
use chrono::Duration;

/// Session cookie settings.
///
/// The cookie is always `HttpOnly`, is scoped to `path`, and lives as long
/// as the token it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie name. Stable for the lifetime of a session.
    pub name: String,

    /// Add the `Secure` attribute (production deployments).
    pub secure: bool,

    /// Cookie path.
    pub path: String,

    /// `SameSite` attribute. `Lax` keeps the session on top-level
    /// navigations from other sites.
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            secure: false,
            path: ROOT_PATH.to_string(),
            same_site: SameSitePolicy::Lax,
        }
    }
}

/// Authentication and authorization configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret. `None` means auth is unconfigured.
    pub secret: Option<String>,

    /// Password granting the `admin` role.
    pub admin_password: Option<String>,

    /// Shared password granting the plain `user` role.
    pub user_password: Option<String>,

    /// Token lifetime.
    ///
    /// Default: 7 days
    pub session_duration: Duration,

    /// Freshness window of cached allow-lists.
    ///
    /// Default: 60 seconds
    pub allow_list_ttl: Duration,

    /// Global user allow-list used when the config store has none.
    ///
    /// Default: `["/"]`
    pub default_user_allow_list: Vec<String>,

    /// Prefixes that skip policy evaluation entirely (API, framework
    /// assets, auth callback, icons, signup). Matched with the allow-list rule.
    pub exempt_prefixes: Vec<String>,

    /// Exact paths that skip policy evaluation (login page, favicon).
    pub exempt_exact: Vec<String>,

    /// File suffixes that skip policy evaluation (static assets).
    pub exempt_suffixes: Vec<String>,

    /// Prefixes reserved for the `admin` role.
    pub admin_only_prefixes: Vec<String>,

    /// Login page used for redirects.
    pub login_path: String,

    /// Session cookie settings.
    pub cookie: CookieConfig,
}

impl AuthConfig {
    /// Create a configuration with the given signing secret and defaults
    /// for everything else.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: non_empty(Some(secret.into())),
            ..Self::default()
        }
    }

    /// Build a configuration from the process environment.
    ///
    /// The secret is the first non-empty of `MAP_AUTH_SECRET`,
    /// `MAP_PASSWORD_ADMIN`, `MAP_PASSWORD_USER`, `MAP_PASSWORD`.
    /// The user password falls back to the legacy `MAP_PASSWORD`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_empty(lookup(key));

        let secret = var(env_vars::AUTH_SECRET)
            .or_else(|| var(env_vars::ADMIN_PASSWORD))
            .or_else(|| var(env_vars::USER_PASSWORD))
            .or_else(|| var(env_vars::LEGACY_PASSWORD));

        let production = [env_vars::APP_ENV, env_vars::NODE_ENV]
            .iter()
            .filter_map(|key| var(key))
            .any(|value| value.eq_ignore_ascii_case("production"));

        Self {
            secret,
            admin_password: var(env_vars::ADMIN_PASSWORD),
            user_password: var(env_vars::USER_PASSWORD)
                .or_else(|| var(env_vars::LEGACY_PASSWORD)),
            cookie: CookieConfig {
                secure: production,
                ..CookieConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns `true` when a signing secret is available.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Returns `true` when at least one password tier is set.
    #[must_use]
    pub const fn uses_password(&self) -> bool {
        self.admin_password.is_some() || self.user_password.is_some()
    }

    /// Set the admin password.
    #[must_use]
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = non_empty(Some(password.into()));
        self
    }

    /// Set the shared user password.
    #[must_use]
    pub fn with_user_password(mut self, password: impl Into<String>) -> Self {
        self.user_password = non_empty(Some(password.into()));
        self
    }

    /// Set the token lifetime.
    #[must_use]
    pub const fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Set the allow-list cache freshness window.
    #[must_use]
    pub const fn with_allow_list_ttl(mut self, ttl: Duration) -> Self {
        self.allow_list_ttl = ttl;
        self
    }

    /// Replace the default global user allow-list.
    #[must_use]
    pub fn with_default_user_allow_list(mut self, pages: Vec<String>) -> Self {
        self.default_user_allow_list = pages;
        self
    }

    /// Replace the admin-only prefix list.
    #[must_use]
    pub fn with_admin_only_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.admin_only_prefixes = prefixes;
        self
    }

    /// Toggle the `Secure` cookie attribute.
    #[must_use]
    pub const fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            admin_password: None,
            user_password: None,
            session_duration: Duration::days(7),
            allow_list_ttl: Duration::seconds(60),
            default_user_allow_list: vec![ROOT_PATH.to_string()],
            exempt_prefixes: ["/api", "/_next", "/auth", "/icons", "/signup"]
                .into_iter()
                .map(String::from)
                .collect(),
            exempt_exact: vec![LOGIN_PATH.to_string(), "/favicon.ico".to_string()],
            exempt_suffixes: vec![".svg".to_string()],
            admin_only_prefixes: vec!["/admin".to_string()],
            login_path: LOGIN_PATH.to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.session_duration, Duration::days(7));
        assert_eq!(config.allow_list_ttl, Duration::seconds(60));
        assert_eq!(config.default_user_allow_list, vec!["/"]);
        assert_eq!(config.cookie.name, "map-auth");
        assert!(!config.cookie.secure);
    }

    #[test]
    fn test_secret_resolution_order() {
        let config = AuthConfig::from_lookup(lookup(&[
            ("MAP_PASSWORD", "legacy"),
            ("MAP_PASSWORD_USER", "user-pw"),
        ]));
        assert_eq!(config.secret.as_deref(), Some("user-pw"));

        let config = AuthConfig::from_lookup(lookup(&[
            ("MAP_AUTH_SECRET", "secret"),
            ("MAP_PASSWORD_ADMIN", "admin-pw"),
        ]));
        assert_eq!(config.secret.as_deref(), Some("secret"));
        assert_eq!(config.admin_password.as_deref(), Some("admin-pw"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = AuthConfig::from_lookup(lookup(&[
            ("MAP_AUTH_SECRET", ""),
            ("MAP_PASSWORD", "legacy"),
        ]));
        assert_eq!(config.secret.as_deref(), Some("legacy"));
        assert_eq!(config.user_password.as_deref(), Some("legacy"));
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_unconfigured_without_any_source() {
        let config = AuthConfig::from_lookup(lookup(&[]));
        assert!(!config.is_configured());
        assert!(!config.uses_password());
    }

    #[test]
    fn test_production_enables_secure_cookie() {
        let config = AuthConfig::from_lookup(lookup(&[("NODE_ENV", "production")]));
        assert!(config.cookie.secure);
        let config = AuthConfig::from_lookup(lookup(&[("APP_ENV", "development")]));
        assert!(!config.cookie.secure);
    }

    #[test]
    fn test_builder() {
        let config = AuthConfig::new("s3cret")
            .with_admin_password("root")
            .with_user_password("guest")
            .with_allow_list_ttl(Duration::seconds(5))
            .with_admin_only_prefixes(vec!["/settings".into()])
            .with_secure_cookies(true);

        assert_eq!(config.secret.as_deref(), Some("s3cret"));
        assert_eq!(config.admin_password.as_deref(), Some("root"));
        assert_eq!(config.user_password.as_deref(), Some("guest"));
        assert_eq!(config.allow_list_ttl, Duration::seconds(5));
        assert_eq!(config.admin_only_prefixes, vec!["/settings"]);
        assert!(config.cookie.secure);
        assert!(!AuthConfig::new("").is_configured());
    }
}
