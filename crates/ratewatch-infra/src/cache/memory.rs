//! In-memory cache implementation - used for tests and single-instance deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use ratewatch_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now > exp).unwrap_or(false)
    }
}

/// Writes between two sweeps of expired entries.
const DEFAULT_PURGE_INTERVAL: usize = 1024;

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Windows are only shared between handlers of this process and are lost on
/// restart. Use `RedisCache` when several instances enforce one limit.
///
/// Expired entries are dropped on read and swept every `purge_interval`
/// writes, so keys that are written once and never read again do not
/// accumulate.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    writes: AtomicUsize,
    purge_interval: usize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_purge_interval(DEFAULT_PURGE_INTERVAL)
    }

    pub fn with_purge_interval(purge_interval: usize) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
            purge_interval: purge_interval.max(1),
        }
    }

    #[cfg(test)]
    async fn stored_entries(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let store = self.store.read().await;
        let Some(entry) = store.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(Instant::now()) {
            drop(store);
            // Re-check under the write lock; a concurrent set may have refreshed it.
            let mut store = self.store.write().await;
            if store
                .get(key)
                .is_some_and(|entry| entry.is_expired(Instant::now()))
            {
                store.remove(key);
            }
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        let now = Instant::now();

        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % self.purge_interval == 0 {
            let before = store.len();
            store.retain(|_, entry| !entry.is_expired(now));
            tracing::debug!(purged = before - store.len(), "Swept expired cache entries");
        }

        let expires_at = ttl.map(|d| now + d);

        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut store = self.store.write().await;
        let now = Instant::now();
        let mut removed = 0;

        store.retain(|key, entry| {
            if !key.starts_with(prefix) {
                return true;
            }
            // Expired entries go too, but only live ones are reported.
            if !entry.is_expired(now) {
                removed += 1;
            }
            false
        });

        Ok(removed)
    }
}
