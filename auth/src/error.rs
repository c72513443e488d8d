//! Error types for authentication and authorization operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the auth core.
///
/// Token and policy errors are resolved at the HTTP boundary: they become
/// a login redirect, a forbidden redirect or a 500. They never propagate
/// past the single policy decision point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════

    /// No signing secret is configured. Fatal to auth (HTTP 500).
    #[error("Authentication is not configured")]
    Unconfigured,

    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Token is malformed, expired or carries a bad signature.
    #[error("Invalid session token: {reason}")]
    InvalidToken {
        /// What check failed (for logs only)
        reason: &'static str,
    },

    /// Wrong password, or unknown login. Both map to the same error.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Authenticated but not permitted.
    #[error("Forbidden: {path}")]
    Forbidden {
        /// Path or operation that was refused
        path: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Accounts
    // ═══════════════════════════════════════════════════════════

    /// Account does not exist (or the session is not tied to one).
    #[error("Account not found")]
    AccountNotFound,

    /// Registration with a login that already exists.
    #[error("Login already taken")]
    LoginTaken,

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Allow-list store unreachable or returned garbage.
    #[error("Remote allow-list fetch failed: {0}")]
    RemoteFetchError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use carto_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::Unconfigured.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::LoginTaken
                | Self::Validation(_)
                | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if the boundary should answer with a login redirect.
    ///
    /// # Examples
    ///
    /// ```
    /// # use carto_auth::AuthError;
    /// assert!(AuthError::InvalidToken { reason: "expired" }.redirects_to_login());
    /// assert!(!AuthError::Unconfigured.redirects_to_login());
    /// ```
    #[must_use]
    pub const fn redirects_to_login(&self) -> bool {
        matches!(self, Self::InvalidToken { .. } | Self::Forbidden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_errors_are_not_user_errors() {
        for err in [
            AuthError::Unconfigured,
            AuthError::RemoteFetchError("timeout".into()),
            AuthError::DatabaseError("down".into()),
            AuthError::InternalError("lock".into()),
        ] {
            assert!(!err.is_user_error(), "{err}");
            assert!(!err.redirects_to_login(), "{err}");
        }
    }

    #[test]
    fn display_includes_reason() {
        let err = AuthError::InvalidToken { reason: "bad signature" };
        assert_eq!(err.to_string(), "Invalid session token: bad signature");
    }
}
