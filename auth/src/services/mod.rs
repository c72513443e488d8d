//! Auth services.
//!
//! [`AuthService`] wires the token authority, the path policy and the
//! session/admin services over one [`AuthEnvironment`]. The web boundary
//! holds a single instance and calls into it per request.

use crate::config::AuthConfig;
use crate::environment::AuthEnvironment;
use crate::policy::PathPolicy;
use crate::providers::{AccountRepository, ConfigStore, PasswordHasher};
use crate::token::TokenAuthority;
use std::sync::Arc;

pub mod admin;
pub mod session;

pub use admin::AdminService;
pub use session::{LoginRequest, LoginSuccess, SessionService, SessionStatus};

/// Every auth operation, sharing one configuration and environment.
pub struct AuthService<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    config: Arc<AuthConfig>,
    tokens: TokenAuthority,
    policy: PathPolicy<A, C>,
    sessions: SessionService<A, H>,
    admin: AdminService<A, C>,
}

impl<A, C, H> AuthService<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    /// Build all services from a configuration and an environment.
    #[must_use]
    pub fn new(config: AuthConfig, env: AuthEnvironment<A, C, H>) -> Self {
        let config = Arc::new(config);
        let tokens = TokenAuthority::new(
            config.secret.as_deref(),
            config.session_duration,
            Arc::clone(&env.clock),
        );
        let policy = PathPolicy::new(
            Arc::clone(&config),
            Arc::clone(&env.accounts),
            Arc::clone(&env.config_store),
            Arc::clone(&env.clock),
        );
        let sessions = SessionService::new(Arc::clone(&config), tokens.clone(), &env);
        let admin = AdminService::new(Arc::clone(&config), &env);

        if !tokens.is_configured() {
            tracing::warn!("No auth secret configured; protected pages will answer 500");
        }

        Self {
            config,
            tokens,
            policy,
            sessions,
            admin,
        }
    }

    /// Shared configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Token issuing and verification.
    #[must_use]
    pub const fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Path authorization.
    #[must_use]
    pub const fn policy(&self) -> &PathPolicy<A, C> {
        &self.policy
    }

    /// Login, registration, status.
    #[must_use]
    pub const fn sessions(&self) -> &SessionService<A, H> {
        &self.sessions
    }

    /// Admin allow-list management.
    #[must_use]
    pub const fn admin(&self) -> &AdminService<A, C> {
        &self.admin
    }
}
