// Activity Service - audit trail writes and queries

use crate::domain::{
    ActivityAction, ActivityEvent, ActivityFilter, ActivityLog, ActivityLogView,
    ActivityResource, PageRequest, Paginated, RequestContext, UserId,
};
use crate::error::Result;
use crate::port::{ActivityLogRepository, IdProvider, TimeProvider};
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_ACTIVITY_PAGE_SIZE: u32 = 50;

/// Audit log query parameters as received from clients
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub action: Option<ActivityAction>,
    pub resource: Option<ActivityResource>,
    pub user_id: Option<UserId>,
    #[serde(alias = "startDate")]
    pub start: Option<i64>,
    #[serde(alias = "endDate")]
    pub end: Option<i64>,
}

impl ActivityQuery {
    pub fn into_filter(self) -> ActivityFilter {
        ActivityFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            action: self.action,
            resource: self.resource,
            user_id: self.user_id,
            start: self.start,
            end: self.end,
            page: PageRequest::new(self.page, self.limit, DEFAULT_ACTIVITY_PAGE_SIZE),
        }
    }
}

pub struct ActivityService {
    repo: Arc<dyn ActivityLogRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ActivityService {
    pub fn new(
        repo: Arc<dyn ActivityLogRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
        }
    }

    /// Persist one audit record
    ///
    /// Failures are logged and swallowed; auditing never breaks a request.
    pub async fn record(&self, event: ActivityEvent, ctx: RequestContext) {
        let log = ActivityLog::from_event(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            event,
            ctx,
        );

        if let Err(e) = self.repo.insert(&log).await {
            tracing::error!(
                error = %e,
                action = %log.action,
                path = %log.path,
                "Failed to record activity"
            );
        }
    }

    pub async fn query(&self, query: ActivityQuery) -> Result<Paginated<ActivityLogView>> {
        let filter = query.into_filter();
        let page = filter.page;
        let (items, total) = self.repo.query(&filter).await?;
        Ok(Paginated::new(items, page, total))
    }
}
