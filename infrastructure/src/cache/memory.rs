//! In-process LRU response cache with per-entry expiry

use async_trait::async_trait;
use consilium_application::{CacheError, CacheStore};
use consilium_domain::CacheKey;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// LRU-bounded cache store with TTL
///
/// Expired entries are dropped when read, and swept before a write that
/// would otherwise evict. Only when every entry is live does the least
/// recently used one go.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl MemoryCacheStore {
    /// * `capacity` - Maximum number of responses kept (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, LruCache<CacheKey, CacheEntry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("cache lock poisoned".to_string()))
    }

    /// Number of entries held, including any not yet found expired
    pub fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry.
    pub fn prune_expired(&self) -> usize {
        match self.entries() {
            Ok(mut entries) => prune(&mut entries, Instant::now()),
            Err(_) => 0,
        }
    }
}

fn prune(entries: &mut LruCache<CacheKey, CacheEntry>, now: Instant) -> usize {
    let expired: Vec<CacheKey> = entries
        .iter()
        .filter(|(_, entry)| entry.expires_at <= now)
        .map(|(key, _)| key.clone())
        .collect();

    for key in &expired {
        entries.pop(key);
    }
    expired.len()
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries()?;

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries()?;
        let now = Instant::now();
        if entries.len() == entries.cap().get() && !entries.contains(key) {
            let swept = prune(&mut entries, now);
            if swept > 0 {
                debug!("Swept {} expired cache entries", swept);
            }
        }
        entries.put(
            key.clone(),
            CacheEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
