//! Login, registration and session inspection.

use crate::config::AuthConfig;
use crate::constants::ROOT_PATH;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{AccountRepository, ConfigStore, PasswordHasher};
use crate::state::{AccountSummary, Identity, NewAccount, Role};
use crate::token::{SessionToken, TokenAuthority};
use crate::utils::{normalize_login, validate_registration};
use carto_core::environment::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Login form.
///
/// With a `login`, the password is checked against that account. Without
/// one, it is tried as the admin password and then the shared user password.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Account login, if logging into a registered account.
    #[serde(default)]
    pub login: Option<String>,

    /// Password.
    #[serde(default)]
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    /// Who logged in.
    pub identity: Identity,

    /// Token to hand to the client.
    pub token: SessionToken,
}

/// What the login page needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// A valid session token was presented (or no password is required).
    pub ok: bool,

    /// Whether a password tier is configured.
    pub use_password: bool,

    /// Role of the presented session, if valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Login, registration and session inspection.
pub struct SessionService<A, H> {
    config: Arc<AuthConfig>,
    tokens: TokenAuthority,
    accounts: Arc<A>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<A, H> SessionService<A, H>
where
    A: AccountRepository,
    H: PasswordHasher,
{
    /// Create a session service.
    #[must_use]
    pub fn new<C: ConfigStore>(
        config: Arc<AuthConfig>,
        tokens: TokenAuthority,
        env: &AuthEnvironment<A, C, H>,
    ) -> Self {
        Self {
            config,
            tokens,
            accounts: Arc::clone(&env.accounts),
            hasher: Arc::clone(&env.hasher),
            clock: Arc::clone(&env.clock),
        }
    }

    /// Authenticate and issue a session token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unconfigured`] when no secret is configured
    /// - [`AuthError::InvalidCredentials`] for an unknown login or a wrong
    ///   password (indistinguishable on purpose)
    /// - store errors while looking the account up
    #[tracing::instrument(skip(self, request), fields(account_login = request.login.is_some()))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginSuccess> {
        if !self.tokens.is_configured() {
            return Err(AuthError::Unconfigured);
        }

        let identity = match request.login.as_deref().map(normalize_login) {
            Some(login) if !login.is_empty() => {
                self.account_login(&login, &request.password).await?
            },
            _ => self.password_login(&request.password)?,
        };

        let token = self.tokens.issue(identity.role, identity.account_id)?;
        tracing::info!(role = %identity.role, "Login succeeded");

        Ok(LoginSuccess { identity, token })
    }

    async fn account_login(&self, login: &str, password: &str) -> Result<Identity> {
        let Some(account) = self.accounts.find_by_login(login).await? else {
            tracing::warn!("Login attempt for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &account.password_hash) {
            tracing::warn!(account_id = %account.id, "Wrong password for account");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity::account(account.id))
    }

    fn password_login(&self, password: &str) -> Result<Identity> {
        let matches = |expected: &Option<String>| {
            expected.as_deref().is_some_and(|expected| {
                constant_time_eq::constant_time_eq(password.as_bytes(), expected.as_bytes())
            })
        };

        if matches(&self.config.admin_password) {
            Ok(Identity::admin())
        } else if matches(&self.config.user_password) {
            Ok(Identity::user())
        } else {
            tracing::warn!("Wrong shared password");
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Register a new account with the default allow-list.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a bad login or short password
    /// - [`AuthError::LoginTaken`] when the login exists
    /// - store or hashing errors
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, login: &str, password: &str) -> Result<AccountSummary> {
        let login = validate_registration(login, password)?;
        let password_hash = self.hasher.hash(password)?;

        let account = self
            .accounts
            .create(NewAccount {
                login,
                password_hash,
                allowed_pages: vec![ROOT_PATH.to_string()],
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(account.summary())
    }

    /// The allow-list of the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccountNotFound`] for sessions not tied to an
    /// account (callers treat that as "no restriction"), or when the
    /// account no longer exists.
    pub async fn allowed_pages(&self, identity: &Identity) -> Result<Vec<String>> {
        let account_id = identity.account_id.ok_or(AuthError::AccountNotFound)?;
        let pages = self.accounts.allowed_pages(account_id).await?;
        Ok(pages.unwrap_or_else(|| self.config.default_user_allow_list.clone()))
    }

    /// Report whether a password is required and who the token belongs to.
    #[must_use]
    pub fn status(&self, token: Option<&str>) -> SessionStatus {
        let use_password = self.tokens.is_configured() && self.config.uses_password();
        let role = token
            .and_then(|t| self.tokens.verify(t).ok())
            .map(|identity| identity.role);

        SessionStatus {
            ok: !use_password || role.is_some(),
            use_password,
            role,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockAccountRepository, MockConfigStore, MockPasswordHasher};
    use carto_testing::ManualClock;

    type Env = AuthEnvironment<MockAccountRepository, MockConfigStore, MockPasswordHasher>;

    fn service(config: AuthConfig) -> (SessionService<MockAccountRepository, MockPasswordHasher>, Env) {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_millis(1_700_000_000_000));
        let env = AuthEnvironment::new(
            MockAccountRepository::new(),
            MockConfigStore::new(),
            MockPasswordHasher::new(),
            Arc::clone(&clock),
        );
        let config = Arc::new(config);
        let tokens = TokenAuthority::new(config.secret.as_deref(), config.session_duration, clock);
        (SessionService::new(config, tokens, &env), env)
    }

    fn request(login: Option<&str>, password: &str) -> LoginRequest {
        LoginRequest {
            login: login.map(String::from),
            password: password.to_string(),
        }
    }

    fn tiered() -> AuthConfig {
        AuthConfig::new("secret")
            .with_admin_password("admin-pw")
            .with_user_password("user-pw")
    }

    #[tokio::test]
    async fn test_password_tiers() {
        let (svc, _) = service(tiered());

        let admin = svc.login(request(None, "admin-pw")).await.unwrap();
        assert_eq!(admin.identity, Identity::admin());

        let user = svc.login(request(None, "user-pw")).await.unwrap();
        assert_eq!(user.identity, Identity::user());

        assert_eq!(
            svc.login(request(None, "nope")).await,
            Err(AuthError::InvalidCredentials)
        );
        // Blank login falls through to the password tiers.
        let blank = svc.login(request(Some("  "), "user-pw")).await.unwrap();
        assert_eq!(blank.identity, Identity::user());
    }

    #[tokio::test]
    async fn test_unconfigured_login() {
        let (svc, _) = service(AuthConfig::default());
        assert_eq!(svc.login(request(None, "x")).await, Err(AuthError::Unconfigured));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (svc, env) = service(tiered());

        let account = svc.register(" Alice ", "wonderland").await.unwrap();
        assert_eq!(account.login, "alice");
        assert_eq!(account.allowed_pages, vec!["/"]);

        let ok = svc.login(request(Some("ALICE"), "wonderland")).await.unwrap();
        assert_eq!(ok.identity, Identity::account(account.id));

        assert_eq!(
            svc.login(request(Some("alice"), "admin-pw")).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            svc.login(request(Some("bob"), "wonderland")).await,
            Err(AuthError::InvalidCredentials)
        );

        let stored = env.accounts.find_by_login("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "wonderland");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let (svc, _) = service(tiered());
        svc.register("alice", "wonderland").await.unwrap();

        assert_eq!(svc.register("ALICE", "another1").await, Err(AuthError::LoginTaken));
        assert!(matches!(svc.register("a", "wonderland").await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register("bob", "short").await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_allowed_pages() {
        let (svc, env) = service(tiered());
        let account = svc.register("alice", "wonderland").await.unwrap();
        env.accounts
            .set_allowed_pages(account.id, vec!["/maps".into()])
            .await
            .unwrap();

        assert_eq!(
            svc.allowed_pages(&Identity::account(account.id)).await.unwrap(),
            vec!["/maps"]
        );
        assert_eq!(svc.allowed_pages(&Identity::admin()).await, Err(AuthError::AccountNotFound));
        assert_eq!(svc.allowed_pages(&Identity::user()).await, Err(AuthError::AccountNotFound));
    }

    #[tokio::test]
    async fn test_status() {
        let (svc, _) = service(tiered());
        let token = svc.login(request(None, "admin-pw")).await.unwrap().token;

        let anonymous = svc.status(None);
        assert!(anonymous.use_password);
        assert!(!anonymous.ok);

        let admin = svc.status(Some(&token.value));
        assert!(admin.ok);
        assert_eq!(admin.role, Some(Role::Admin));

        let (open, _) = service(AuthConfig::new("secret"));
        assert!(open.status(None).ok);
        assert!(!open.status(None).use_password);
    }
}
