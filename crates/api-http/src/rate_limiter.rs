//! Rate Limiter (Token Bucket Algorithm)
//!
//! Throttles the credential endpoints (login, register, refresh) per client.
//! Each client key owns an atomic bucket; the map lock is only held to find it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Buckets kept before idle (full) ones are pruned
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Single token bucket updated with a CAS loop
struct TokenBucket {
    // Upper 32 bits: tokens
    // Lower 32 bits: last refill (milliseconds since `origin`, wraps every ~49.7 days)
    packed: AtomicU64,
    origin: Instant,
}

impl TokenBucket {
    fn full(burst: u32, origin: Instant) -> Self {
        let elapsed_ms = origin.elapsed().as_millis() as u32;
        Self {
            packed: AtomicU64::new(pack(burst, elapsed_ms)),
            origin,
        }
    }

    fn try_take(&self, burst: u32, refill_per_sec: u32) -> bool {
        loop {
            let packed = self.packed.load(Ordering::Acquire);
            let elapsed_ms = self.origin.elapsed().as_millis() as u32;
            let (tokens, last_refill_ms) = refill(packed, elapsed_ms, burst, refill_per_sec);

            if tokens == 0 {
                return false;
            }

            let next = pack(tokens - 1, last_refill_ms);
            if self
                .packed
                .compare_exchange(packed, next, Ordering::Release, Ordering::Acquire)
                .is_ok()
            {
                return true;
            }
        }
    }

    fn is_full(&self, burst: u32, refill_per_sec: u32) -> bool {
        let packed = self.packed.load(Ordering::Acquire);
        let elapsed_ms = self.origin.elapsed().as_millis() as u32;
        refill(packed, elapsed_ms, burst, refill_per_sec).0 >= burst
    }
}

fn pack(tokens: u32, last_refill_ms: u32) -> u64 {
    ((tokens as u64) << 32) | last_refill_ms as u64
}

/// Tokens available at `elapsed_ms` and the refill mark to store
///
/// The mark only advances by the time actually converted into tokens so
/// partial progress carries over to the next call. Timestamps are compared
/// with wrapping arithmetic since the millisecond clock wraps at `u32::MAX`.
fn refill(packed: u64, elapsed_ms: u32, burst: u32, refill_per_sec: u32) -> (u32, u32) {
    let tokens = (packed >> 32) as u32;
    let last_refill_ms = (packed & 0xFFFF_FFFF) as u32;
    if refill_per_sec == 0 {
        return (tokens.min(burst), last_refill_ms);
    }

    let delta_ms = elapsed_ms.wrapping_sub(last_refill_ms) as u64;
    let added = delta_ms * refill_per_sec as u64 / 1000;
    let total = tokens as u64 + added;
    if total >= burst as u64 {
        return (burst, elapsed_ms);
    }

    let consumed_ms = added * 1000 / refill_per_sec as u64;
    (total as u32, last_refill_ms.wrapping_add(consumed_ms as u32))
}

/// Per-client token-bucket rate limiter
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Arc<TokenBucket>>>,
    burst: u32,
    refill_per_sec: u32,
    origin: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `burst` - Requests a client may make back to back
    /// * `refill_per_sec` - Tokens returned to each bucket per second
    ///
    /// # Example
    /// Ten login attempts in a burst, then one every second:
    /// `RateLimiter::new(10, 1)`
    pub fn new(burst: u32, refill_per_sec: u32) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            burst: burst.max(1),
            refill_per_sec,
            origin: Instant::now(),
        }
    }

    /// Check whether `client` may proceed (consumes 1 token)
    pub fn check(&self, client: &str) -> bool {
        let bucket = {
            let mut buckets = self
                .buckets
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if buckets.len() >= MAX_TRACKED_CLIENTS && !buckets.contains_key(client) {
                buckets.retain(|_, b| !b.is_full(self.burst, self.refill_per_sec));
            }

            buckets
                .entry(client.to_string())
                .or_insert_with(|| Arc::new(TokenBucket::full(self.burst, self.origin)))
                .clone()
        };

        let allowed = bucket.try_take(self.burst, self.refill_per_sec);
        if !allowed {
            tracing::warn!(client = %client, "Rate limit exceeded");
        }
        allowed
    }

    /// Clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.buckets
            .lock()
            .map(|b| b.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}
