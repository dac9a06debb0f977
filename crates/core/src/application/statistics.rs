// Statistics Service - headline numbers for the public site

use crate::application::cache::TtlCache;
use crate::error::Result;
use crate::port::{ContentRepository, TimeProvider};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const STATISTICS_CACHE_TTL_MS: i64 = 5 * 60 * 1000;

const TEAM_TYPE: &str = "team";
const CLIENTS_TYPE: &str = "clients";
const PROJECTS_TYPE: &str = "projects";
const LOCATION_FIELD: &str = "location";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatistics {
    pub team_count: i64,
    pub clients_count: i64,
    pub projects_count: i64,
    pub cities_count: i64,
}

pub struct StatisticsService {
    repo: Arc<dyn ContentRepository>,
    cache: TtlCache<SiteStatistics>,
}

impl StatisticsService {
    pub fn new(repo: Arc<dyn ContentRepository>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            repo,
            cache: TtlCache::new(STATISTICS_CACHE_TTL_MS, time_provider),
        }
    }

    /// Cached statistics; zeros when the store cannot be read
    pub async fn get(&self) -> SiteStatistics {
        if let Some(stats) = self.cache.get().await {
            return stats;
        }

        match self.compute().await {
            Ok(stats) => {
                self.cache.put(stats).await;
                stats
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to compute site statistics");
                SiteStatistics::default()
            }
        }
    }

    async fn compute(&self) -> Result<SiteStatistics> {
        let team_count = self.repo.count_published(TEAM_TYPE).await?;
        let clients_count = self.repo.count_published(CLIENTS_TYPE).await?;
        let projects_count = self.repo.count_published(PROJECTS_TYPE).await?;

        let mut cities = BTreeSet::new();
        for content_type in [PROJECTS_TYPE, TEAM_TYPE] {
            let values = self
                .repo
                .published_field_values(content_type, LOCATION_FIELD)
                .await?;
            cities.extend(values.iter().filter_map(city_name));
        }

        Ok(SiteStatistics {
            team_count,
            clients_count,
            projects_count,
            cities_count: cities.len() as i64,
        })
    }
}

fn city_name(value: &Value) -> Option<String> {
    let name = value.as_str()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}
