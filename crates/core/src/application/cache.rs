// Single-value TTL cache

use crate::port::TimeProvider;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Slot<T> {
    /// Bumped by every invalidation
    generation: u64,
    entry: Option<(i64, T)>,
}

/// Holds one computed value for `ttl_ms` milliseconds
///
/// Loaders that race an invalidation should read [`TtlCache::generation`]
/// before loading and store with [`TtlCache::put_if_current`], so a value
/// loaded before the invalidation is never put back.
pub struct TtlCache<T> {
    ttl_ms: i64,
    time_provider: Arc<dyn TimeProvider>,
    slot: RwLock<Slot<T>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl_ms: i64, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            ttl_ms,
            time_provider,
            slot: RwLock::new(Slot {
                generation: 0,
                entry: None,
            }),
        }
    }

    /// Cached value if still fresh
    pub async fn get(&self) -> Option<T> {
        let now = self.time_provider.now_millis();
        let slot = self.slot.read().await;
        match slot.entry.as_ref() {
            Some((stored_at, value)) if now - stored_at < self.ttl_ms => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }

    pub async fn put(&self, value: T) {
        let now = self.time_provider.now_millis();
        self.slot.write().await.entry = Some((now, value));
    }

    /// Store `value` unless the cache was invalidated since `generation` was read
    ///
    /// # Returns
    /// `true` if the value was stored
    pub async fn put_if_current(&self, generation: u64, value: T) -> bool {
        let now = self.time_provider.now_millis();
        let mut slot = self.slot.write().await;
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some((now, value));
        true
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.generation = slot.generation.wrapping_add(1);
        slot.entry = None;
    }
}
