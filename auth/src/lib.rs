//! # Carto Authentication & Authorization
//!
//! Stateless session tokens and path-based authorization for the Carto
//! mapping application.
//!
//! ## Features
//!
//! - **Signed tokens**: HMAC-SHA256 over a compact `role[:account]:expiry`
//!   payload; no server-side session storage
//! - **Tiered login**: registered accounts, then an admin password, then a
//!   shared user password
//! - **Path policy**: admin-only prefixes plus global or per-account
//!   allow-lists, cached for a short freshness window
//! - **Testable**: every store is a trait with an in-memory mock
//!
//! ## Architecture
//!
//! ```text
//! Cookie ─► TokenAuthority::verify ─► Identity ─► PathPolicy::decide ─► Decision
//!                                                      │
//!                                    TtlCache ◄────────┤
//!                                                      ▼
//!                                     ConfigStore / AccountRepository
//! ```
//!
//! ## Example
//!
//! ```
//! use carto_auth::mocks::{MockAccountRepository, MockConfigStore, MockPasswordHasher};
//! use carto_auth::{AuthConfig, AuthEnvironment, AuthService, Decision, Identity};
//! use carto_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let env = AuthEnvironment::new(
//!     MockAccountRepository::new(),
//!     MockConfigStore::new(),
//!     MockPasswordHasher::new(),
//!     Arc::new(SystemClock),
//! );
//! let auth = AuthService::new(AuthConfig::new("secret"), env);
//!
//! let token = auth.tokens().issue(carto_auth::Role::Admin, None).unwrap();
//! let identity = auth.tokens().verify(&token.value).unwrap();
//! assert_eq!(identity, Identity::admin());
//!
//! let decision = auth.policy().decide(Some(&identity), "/admin").await;
//! assert_eq!(decision, Decision::Allowed);
//! # });
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod cache;
pub mod config;
pub mod constants;
pub mod cookie;
pub mod environment;
pub mod error;
pub mod policy;
pub mod providers;
pub mod services;
pub mod state;
pub mod stores;
pub mod token;
pub mod utils;

// Mock providers (for testing)
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-exports
pub use config::{AuthConfig, CookieConfig};
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use policy::PathPolicy;
pub use services::{AdminService, AuthService, LoginRequest, SessionService, SessionStatus};
pub use state::{AccountId, Decision, Identity, Role};
pub use token::{SessionToken, TokenAuthority};
