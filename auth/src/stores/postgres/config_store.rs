//! PostgreSQL key-value config store.

use crate::error::{AuthError, Result};
use crate::providers::ConfigStore;
use sqlx::PgPool;

/// `app_config` table.
#[derive(Debug, Clone)]
pub struct PostgresConfigStore {
    pool: PgPool,
}

impl PostgresConfigStore {
    /// Create a new config store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ConfigStore for PostgresConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM app_config WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::RemoteFetchError(format!("Failed to read config {key}: {e}")))?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO app_config (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Failed to write config {key}: {e}")))?;

        Ok(())
    }
}
