//! Application state shared by handlers and the auth gate.

use carto_auth::AuthService;
use carto_auth::providers::{AccountRepository, ConfigStore, PasswordHasher};
use std::sync::Arc;

/// Shared state: one [`AuthService`] for the whole process.
///
/// Generic over the providers so tests run the real router on in-memory
/// mocks while the server runs it on Postgres.
pub struct AppState<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    /// Tokens, policy, sessions and admin operations.
    pub auth: Arc<AuthService<A, C, H>>,
}

impl<A, C, H> AppState<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    /// Wrap an auth service.
    #[must_use]
    pub fn new(auth: AuthService<A, C, H>) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}

impl<A, C, H> Clone for AppState<A, C, H>
where
    A: AccountRepository,
    C: ConfigStore,
    H: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
        }
    }
}
