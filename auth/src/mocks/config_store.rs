//! Mock config store for testing.

use crate::error::{AuthError, Result};
use crate::providers::ConfigStore;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock key-value config store.
#[derive(Debug, Clone, Default)]
pub struct MockConfigStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
    fetches: Arc<AtomicUsize>,
}

impl MockConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a `RemoteFetchError` (simulated outage).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get` calls that reached the store.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::RemoteFetchError("config store unavailable".into()));
        }
        Ok(())
    }
}

impl ConfigStore for MockConfigStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let result = self.check_available().and_then(|()| {
            Ok(self
                .values
                .lock()
                .map_err(|_| AuthError::InternalError("Mutex lock failed".into()))?
                .get(key)
                .cloned())
        });

        async move { result }
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send {
        let result = self.check_available().and_then(|()| {
            self.values
                .lock()
                .map_err(|_| AuthError::InternalError("Mutex lock failed".into()))?
                .insert(key.to_string(), value);
            Ok(())
        });

        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set() {
        let store = MockConfigStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "[\"/\"]".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[\"/\"]"));
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MockConfigStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.get("k").await, Err(AuthError::RemoteFetchError(_))));
        assert!(matches!(store.set("k", String::new()).await, Err(AuthError::RemoteFetchError(_))));
    }
}
