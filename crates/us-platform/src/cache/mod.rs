//! Cache invalidation.
//!
//! Cached user records are populated by a separate read path. Writers only
//! ever evict. A failed eviction is reported as an [`EvictionOutcome`], never
//! as an error, because it must not undo a committed write.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::{MemoryCacheInvalidator, NoopCacheInvalidator};
pub use self::redis::RedisCacheInvalidator;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Cache command failed: {0}")]
    Command(#[from] ::redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Result of removing one key from the shared cache.
#[derive(Debug)]
pub enum EvictionOutcome {
    /// The command succeeded; `removed` is how many keys actually existed.
    Evicted { removed: u64 },
    Failed(CacheError),
}

impl EvictionOutcome {
    pub fn is_evicted(&self) -> bool {
        matches!(self, Self::Evicted { .. })
    }
}

#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Remove `key` from the shared cache.
    async fn evict(&self, key: &str) -> EvictionOutcome;
}
