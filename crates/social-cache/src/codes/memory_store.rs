//! Process-local verification code storage with lazy expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use social_core::traits::{CodeStore, RepoResult};

#[derive(Clone, Default)]
pub struct MemoryCodeStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryCodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> RepoResult<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> RepoResult<bool> {
        let mut entries = self.entries.lock();
        let live = entries
            .remove(key)
            .is_some_and(|(_, expires_at)| Instant::now() < expires_at);
        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = MemoryCodeStore::new();
        store.put("k", "123456", 600).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("123456"));
        assert!(store.remove("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
        assert!(!store.remove("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let store = MemoryCodeStore::new();
        store.put("k", "v", 0).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryCodeStore::new();
        store.put("k", "old", 600).await.unwrap();
        store.put("k", "new", 600).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
