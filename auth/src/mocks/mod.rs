//! Mock provider implementations for testing.
//!
//! In-memory implementations of every provider trait, with failure
//! injection (`set_unavailable`) and fetch counters so tests can observe
//! caching and fail-closed behavior.

pub mod account;
pub mod config_store;
pub mod password;

pub use account::MockAccountRepository;
pub use config_store::MockConfigStore;
pub use password::MockPasswordHasher;
