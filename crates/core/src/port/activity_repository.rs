// Activity Log Repository Port (Interface)

use crate::domain::{ActivityFilter, ActivityLog, ActivityLogView};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    async fn insert(&self, log: &ActivityLog) -> Result<()>;

    /// One page of records (newest first) plus the total match count
    async fn query(&self, filter: &ActivityFilter) -> Result<(Vec<ActivityLogView>, i64)>;
}
