// Settings Repository Port (Interface)

use crate::domain::Setting;
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Insert or update by key and return the stored row
    ///
    /// A `None` category or description leaves the stored value untouched.
    async fn upsert(&self, setting: &Setting) -> Result<Setting>;

    /// All settings, optionally restricted to one category, ordered by key
    async fn list(&self, category: Option<String>) -> Result<Vec<Setting>>;
}
