//! PostgreSQL storage implementations.
//!
//! - `accounts`: registered accounts and their allow-lists
//! - `app_config`: process-wide key-value settings
//!
//! Queries are checked at runtime, so building does not need a database.

use crate::error::{AuthError, Result};
use sqlx::PgPool;

pub mod account;
pub mod config_store;

// Re-exports
pub use account::PostgresAccountRepository;
pub use config_store::PostgresConfigStore;

/// Run the auth migrations (`accounts`, `app_config`).
///
/// # Errors
///
/// Returns error if migrations fail.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Migration failed: {e}")))
}
