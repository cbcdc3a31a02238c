//! Cache store port
//!
//! A pluggable key → text store with per-entry TTL. The cache is an
//! optimization only: callers treat every error as a miss.

use async_trait::async_trait;
use consilium_domain::CacheKey;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Key → text store with expiry
///
/// Implementations must be safe for concurrent use; callers add no
/// synchronization of their own.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live (non-expired) entry
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store an entry that expires after `ttl`
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache that never stores anything, used when caching is disabled
pub struct NoCache;

#[async_trait]
impl CacheStore for NoCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
