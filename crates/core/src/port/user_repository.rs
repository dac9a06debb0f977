// User Repository Port (Interface)

use crate::domain::User;
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for admin accounts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user (Conflict if the email is taken)
    async fn insert(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Lookup by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Number of accounts (bootstrap detection)
    async fn count(&self) -> Result<i64>;

    async fn update_last_login(&self, id: &str, at: i64) -> Result<()>;
}
