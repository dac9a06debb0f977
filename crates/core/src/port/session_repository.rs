// Refresh Session Repository Port (Interface)

use crate::domain::RefreshSession;
use crate::error::Result;
use async_trait::async_trait;

/// Server-side store of live refresh tokens, keyed by token id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Remember a freshly issued refresh token
    async fn store(&self, session: &RefreshSession) -> Result<()>;

    /// Is `jti` a live (stored) refresh token of this user
    async fn exists(&self, user_id: &str, jti: &str) -> Result<bool>;

    /// Atomically replace `old_jti` with `next`
    ///
    /// # Returns
    /// `false` when `old_jti` is not (or no longer) stored for this user,
    /// in which case nothing is written
    async fn rotate(&self, user_id: &str, old_jti: &str, next: &RefreshSession) -> Result<bool>;

    /// Forget a refresh token; `true` if it existed
    async fn revoke(&self, user_id: &str, jti: &str) -> Result<bool>;

    /// Forget every refresh token of a user, returning how many were stored
    async fn revoke_all(&self, user_id: &str) -> Result<u64>;

    /// Drop sessions whose `expires_at` is at or before `now` (epoch ms)
    async fn prune_expired(&self, now: i64) -> Result<u64>;
}
