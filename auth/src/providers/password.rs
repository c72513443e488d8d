//! Password hashing.

use crate::error::{AuthError, Result};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

/// One-way, cost-factored password hashing.
///
/// Only used at login and registration; never on the per-request path.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing string (salt included).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`] if hashing fails.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a password against a stored hash.
    ///
    /// Returns `false` for a mismatch and for an unparseable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with default parameters, PHC string output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
                false
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = Argon2PasswordHasher::new();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_garbage_hash_does_not_verify() {
        assert!(!Argon2PasswordHasher::new().verify("pw", "not-a-phc-string"));
    }
}
