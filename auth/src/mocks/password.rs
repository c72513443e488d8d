//! Mock password hasher for testing.

use crate::error::Result;
use crate::providers::PasswordHasher;

/// Reversible stand-in for Argon2 so tests stay fast.
///
/// Hashes are `mock$<password>`. Never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPasswordHasher;

impl MockPasswordHasher {
    /// Create a mock hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PasswordHasher for MockPasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("mock${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("mock$") == Some(password)
    }
}
