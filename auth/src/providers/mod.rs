//! Authentication providers.
//!
//! Traits for every external dependency of the auth core: account storage,
//! the key-value config store and password hashing. Services depend on these
//! traits; the application wires in Postgres stores (feature `postgres`) or
//! the in-memory mocks (feature `test-utils`).
//!
//! Store traits return `impl Future + Send` so services built on them can
//! run inside multi-threaded HTTP handlers.

pub mod account;
pub mod config_store;
pub mod password;

pub use account::AccountRepository;
pub use config_store::ConfigStore;
pub use password::{Argon2PasswordHasher, PasswordHasher};
