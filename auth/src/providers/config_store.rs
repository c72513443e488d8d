//! Key-value config store trait.

use crate::error::Result;
use std::future::Future;

/// Process-wide key-value settings (the `app_config` table in production).
///
/// Values are opaque strings; the allow-list is stored as a JSON array.
pub trait ConfigStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;
}
