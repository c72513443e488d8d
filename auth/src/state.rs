//! Authentication state types.
//!
//! Roles, identities, accounts and the outcome of a policy decision.
//! All types are `Clone` so they can travel through request extensions.

use crate::constants::{FORBIDDEN_PARAM, RETURN_URL_PARAM};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub uuid::Uuid);

impl AccountId {
    /// Generate a new random `AccountId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// Role carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including admin-only paths.
    Admin,
    /// Access restricted by an allow-list.
    User,
}

impl Role {
    /// Wire name of the role, as it appears in token payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parse a wire name. Anything but `admin` or `user` is rejected.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a verified session token belongs to.
///
/// An account id is only ever present for the `user` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Session role.
    pub role: Role,

    /// Account the session is tied to, if any.
    #[serde(rename = "accountId", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
}

impl Identity {
    /// Admin identity.
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            role: Role::Admin,
            account_id: None,
        }
    }

    /// Plain user identity governed by the global allow-list.
    #[must_use]
    pub const fn user() -> Self {
        Self {
            role: Role::User,
            account_id: None,
        }
    }

    /// User identity tied to a registered account.
    #[must_use]
    pub const fn account(account_id: AccountId) -> Self {
        Self {
            role: Role::User,
            account_id: Some(account_id),
        }
    }

    /// Returns `true` for the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Policy Decision
// ═══════════════════════════════════════════════════════════════════════

/// Outcome of evaluating a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through.
    Allowed,
    /// No valid session, or the path is not on the allow-list.
    Denied,
    /// Authenticated user hitting an admin-only path.
    Forbidden,
}

impl Decision {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
            Self::Forbidden => "forbidden",
        }
    }

    /// Where to send the browser for a refused request.
    ///
    /// Returns `None` for [`Decision::Allowed`].
    ///
    /// # Examples
    ///
    /// ```
    /// use carto_auth::state::Decision;
    ///
    /// assert_eq!(
    ///     Decision::Denied.redirect_location("/login", "/maps/1").as_deref(),
    ///     Some("/login?returnUrl=%2Fmaps%2F1"),
    /// );
    /// assert_eq!(
    ///     Decision::Forbidden.redirect_location("/login", "/admin").as_deref(),
    ///     Some("/login?returnUrl=%2Fadmin&forbidden=1"),
    /// );
    /// ```
    #[must_use]
    pub fn redirect_location(self, login_path: &str, requested_path: &str) -> Option<String> {
        let base = format!(
            "{login_path}?{RETURN_URL_PARAM}={}",
            urlencoding::encode(requested_path)
        );
        match self {
            Self::Allowed => None,
            Self::Denied => Some(base),
            Self::Forbidden => Some(format!("{base}&{FORBIDDEN_PARAM}=1")),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════════════════

/// A registered account as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,

    /// Normalized (trimmed, lowercased) login.
    pub login: String,

    /// Argon2 PHC string.
    pub password_hash: String,

    /// Pages this account may visit.
    pub allowed_pages: Vec<String>,

    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Public view of the account (no password hash).
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            login: self.login.clone(),
            allowed_pages: self.allowed_pages.clone(),
            created_at: self.created_at,
        }
    }
}

/// Account as exposed to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// Account ID.
    pub id: AccountId,

    /// Login.
    pub login: String,

    /// Pages this account may visit.
    pub allowed_pages: Vec<String>,

    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Account about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Normalized login.
    pub login: String,

    /// Argon2 PHC string.
    pub password_hash: String,

    /// Initial allow-list.
    pub allowed_pages: Vec<String>,

    /// Registration time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_name() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("guest"), None);
    }

    #[test]
    fn identity_serializes_without_empty_account() {
        let json = serde_json::to_value(Identity::admin()).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "role": "admin" }));

        let id = AccountId::new();
        let json = serde_json::to_value(Identity::account(id)).unwrap_or_default();
        assert_eq!(json["role"], "user");
        assert_eq!(json["accountId"], id.to_string());
    }

    #[test]
    fn allowed_has_no_redirect() {
        assert_eq!(Decision::Allowed.redirect_location("/login", "/"), None);
    }

    #[test]
    fn account_id_parses_uuid() {
        let id = AccountId::new();
        assert_eq!(id.to_string().parse::<AccountId>().ok(), Some(id));
        assert!("not-a-uuid".parse::<AccountId>().is_err());
    }
}
