// Password Hasher Port

use crate::error::Result;
use async_trait::async_trait;

/// One-way password hashing (CPU heavy; implementations must not block the runtime)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` on mismatch; `Err` only for malformed hashes or internal failures
    async fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
