//! PostgreSQL account repository implementation.
//!
//! # Example
//!
//! ```no_run
//! use carto_auth::stores::postgres::PostgresAccountRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/carto").await?;
//! let repo = PostgresAccountRepository::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::constants::ROOT_PATH;
use crate::error::{AuthError, Result};
use crate::providers::AccountRepository;
use crate::state::{Account, AccountId, AccountSummary, NewAccount};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

type AccountRow = (Uuid, String, String, Option<Vec<String>>, DateTime<Utc>);

/// PostgreSQL account repository.
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Create a new PostgreSQL account repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A NULL `allowed_pages` column means the account only sees the root page.
fn account_from_row((id, login, password_hash, allowed_pages, created_at): AccountRow) -> Account {
    Account {
        id: AccountId(id),
        login,
        password_hash,
        allowed_pages: allowed_pages.unwrap_or_else(|| vec![ROOT_PATH.to_string()]),
        created_at,
    }
}

impl AccountRepository for PostgresAccountRepository {
    async fn find_by_login(&self, login: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, login, password_hash, allowed_pages, created_at
            FROM accounts
            WHERE login = $1
            ",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Failed to get account: {e}")))?;

        Ok(row.map(account_from_row))
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        let id = AccountId::new();

        sqlx::query(
            r"
            INSERT INTO accounts (id, login, password_hash, allowed_pages, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id.0)
        .bind(&account.login)
        .bind(&account.password_hash)
        .bind(&account.allowed_pages)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Unique constraint on login
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::LoginTaken;
                }
            }
            AuthError::DatabaseError(format!("Failed to create account: {e}"))
        })?;

        Ok(Account {
            id,
            login: account.login,
            password_hash: account.password_hash,
            allowed_pages: account.allowed_pages,
            created_at: account.created_at,
        })
    }

    async fn allowed_pages(&self, id: AccountId) -> Result<Option<Vec<String>>> {
        let row: Option<(Option<Vec<String>>,)> =
            sqlx::query_as("SELECT allowed_pages FROM accounts WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AuthError::RemoteFetchError(format!("Failed to get allow-list: {e}")))?;

        row.map(|(pages,)| pages).ok_or(AuthError::AccountNotFound)
    }

    async fn set_allowed_pages(&self, id: AccountId, pages: Vec<String>) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET allowed_pages = $2 WHERE id = $1")
            .bind(id.0)
            .bind(&pages)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to update allow-list: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AccountSummary>> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r"
            SELECT id, login, password_hash, allowed_pages, created_at
            FROM accounts
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Failed to list accounts: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|row| account_from_row(row).summary())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(allowed_pages: Option<Vec<String>>) -> AccountRow {
        (Uuid::new_v4(), "ada".to_string(), "hash".to_string(), allowed_pages, Utc::now())
    }

    #[test]
    fn null_allowed_pages_default_to_root() {
        let account = account_from_row(row(None));
        assert_eq!(account.allowed_pages, vec!["/".to_string()]);
    }

    #[test]
    fn stored_allowed_pages_are_kept() {
        let account = account_from_row(row(Some(vec![])));
        assert!(account.allowed_pages.is_empty());

        let account = account_from_row(row(Some(vec!["/maps/*".to_string()])));
        assert_eq!(account.allowed_pages, vec!["/maps/*".to_string()]);
        assert_eq!(account.login, "ada");
    }
}
