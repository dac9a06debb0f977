// SQLite Maintenance Implementation
use async_trait::async_trait;
use folio_core::error::{AppError, Result};
use crate::SqliteSessionRepository;
use folio_core::port::{Maintenance, MaintenanceStats, SessionRepository, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    sessions: SqliteSessionRepository,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            sessions: SqliteSessionRepository::new(pool.clone()),
            pool,
            time_provider,
        }
    }

    /// Get DB file size in bytes
    async fn get_db_size(&self) -> Result<i64> {
        // Query database page count and page size
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        Ok(page_count * page_size)
    }

    async fn count(&self, table: &str) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count {}: {}", table, e)))
    }
}

fn to_mb(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = to_mb(self.get_db_size().await?);

        // Run VACUUM (reclaims space and defragments)
        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        let size_after = to_mb(self.get_db_size().await?);
        let reclaimed = (size_before - size_after).max(0.0);

        info!(
            size_before_mb = size_before,
            size_after_mb = size_after,
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn gc_activity_logs(&self, retention_days: i64) -> Result<i64> {
        let cutoff_time = self.time_provider.now_millis() - retention_days * DAY_MS;

        info!(
            retention_days = retention_days,
            cutoff_time = cutoff_time,
            "Running activity log GC"
        );

        let result = sqlx::query("DELETE FROM activity_logs WHERE timestamp < ?")
            .bind(cutoff_time)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Activity log GC failed: {}", e)))?;

        let deleted = result.rows_affected() as i64;
        info!(deleted_logs = deleted, "Activity log GC completed");

        Ok(deleted)
    }

    async fn gc_sessions(&self) -> Result<i64> {
        let now = self.time_provider.now_millis();

        let deleted = self
            .sessions
            .prune_expired(now)
            .await
            .map_err(|e| AppError::Internal(format!("Session GC failed: {}", e)))?;
        info!(deleted_sessions = deleted, "Expired session GC completed");

        Ok(deleted as i64)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let db_size_bytes = self.get_db_size().await?;

        let freelist_count: i64 = sqlx::query_scalar("PRAGMA freelist_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get freelist count: {}", e)))?;
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        // Free pages as a share of the file
        let fragmentation_percent = if page_count > 0 {
            (freelist_count as f64 / page_count as f64) * 100.0
        } else {
            0.0
        };

        Ok(MaintenanceStats {
            db_size_mb: to_mb(db_size_bytes),
            db_size_bytes,
            content_count: self.count("content").await?,
            media_count: self.count("media").await?,
            activity_log_count: self.count("activity_logs").await?,
            session_count: self.count("refresh_sessions").await?,
            fragmentation_percent,
        })
    }
}
