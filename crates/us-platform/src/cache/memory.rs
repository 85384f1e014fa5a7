//! In-process invalidators: a no-op for deployments without a cache and a
//! recording one for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CacheError, CacheInvalidator, EvictionOutcome};

/// Used when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheInvalidator;

#[async_trait]
impl CacheInvalidator for NoopCacheInvalidator {
    async fn evict(&self, _key: &str) -> EvictionOutcome {
        EvictionOutcome::Evicted { removed: 0 }
    }
}

/// Records every eviction request. Can be switched into a failing mode to
/// simulate an unreachable cache.
#[derive(Debug, Default)]
pub struct MemoryCacheInvalidator {
    evicted: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MemoryCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every key requested so far, including requests that failed.
    pub fn evicted_keys(&self) -> Vec<String> {
        self.evicted.lock().clone()
    }
}

#[async_trait]
impl CacheInvalidator for MemoryCacheInvalidator {
    async fn evict(&self, key: &str) -> EvictionOutcome {
        self.evicted.lock().push(key.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return EvictionOutcome::Failed(CacheError::Unavailable("simulated outage".to_string()));
        }
        EvictionOutcome::Evicted { removed: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_invalidator_records_keys() {
        let cache = MemoryCacheInvalidator::new();
        assert!(cache.evict("a").await.is_evicted());
        cache.set_failing(true);
        assert!(!cache.evict("b").await.is_evicted());
        assert_eq!(cache.evicted_keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_noop_never_fails() {
        assert!(matches!(
            NoopCacheInvalidator.evict("x").await,
            EvictionOutcome::Evicted { removed: 0 }
        ));
    }
}
