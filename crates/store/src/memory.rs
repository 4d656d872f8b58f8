//! In-memory key-value store backed by a `HashMap` behind a `Mutex`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use telemost_types::{KvStore, TelemostError, traits::Result};

/// An in-memory [`KvStore`] implementation for testing and ephemeral use.
#[derive(Default)]
pub struct InMemoryKvStore {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryKvStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |m| m.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.data
            .lock()
            .map_err(|e| TelemostError::Storage(e.to_string()))
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryKvStore::new();
        store.set("k", b"value").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some(&b"value"[..]));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryKvStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = InMemoryKvStore::new();
        store.set("k", b"v").await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let store = InMemoryKvStore::new();
        store.set("k", b"first").await.unwrap();
        store.set("k", b"second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"second");
        assert_eq!(store.len(), 1);
    }
}
