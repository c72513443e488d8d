//! Time-bounded allow-list cache.
//!
//! Entries are `(value, fetched_at)` pairs that expire purely by age; there
//! is no explicit invalidation. Failed fetches are never cached.
//!
//! Concurrent misses on the same key may each run the fetcher. The fetch is
//! read-only and idempotent, so the last writer simply wins.

use crate::error::Result;
use carto_core::environment::Clock;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    fetched_at: DateTime<Utc>,
}

/// Map of values that go stale `ttl` after they were fetched.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Return the cached value for `key` if it is younger than the TTL,
    /// otherwise run `fetch`, store its value and return it.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's error. The stale entry (if any) is left in
    /// place and nothing new is stored.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.fresh(key).await {
            return Ok(value);
        }

        let value = fetch().await?;

        self.entries.write().await.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                fetched_at: self.clock.now(),
            },
        );

        Ok(value)
    }

    /// Cached value for `key`, if present and fresh.
    pub async fn fresh(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Number of stored entries, fresh or stale.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
