//! Authentication environment.
//!
//! Bundles the external dependencies the auth services need, so they can be
//! swapped between Postgres stores and in-memory mocks.

use crate::providers::{AccountRepository, ConfigStore, PasswordHasher};
use carto_core::environment::Clock;
use std::sync::Arc;

/// Authentication environment.
///
/// # Type Parameters
///
/// - `A`: Account repository
/// - `C`: Config store
/// - `H`: Password hasher
pub struct AuthEnvironment<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    /// Account repository (`PostgreSQL` `accounts` table).
    pub accounts: Arc<A>,

    /// Key-value settings (`PostgreSQL` `app_config` table).
    pub config_store: Arc<C>,

    /// Password hasher (Argon2 in production).
    pub hasher: Arc<H>,

    /// Time source for token expiry, cache freshness and account timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<A, C, H> AuthEnvironment<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    /// Create a new auth environment.
    #[must_use]
    pub fn new(accounts: A, config_store: C, hasher: H, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: Arc::new(accounts),
            config_store: Arc::new(config_store),
            hasher: Arc::new(hasher),
            clock,
        }
    }
}

impl<A, C, H> Clone for AuthEnvironment<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            config_store: Arc::clone(&self.config_store),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}
