// SQLite SessionRepository Implementation
// Refresh-token rotation runs inside one transaction

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use folio_core::domain::RefreshSession;
use folio_core::error::Result;
use folio_core::port::SessionRepository;
use sqlx::SqlitePool;

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn store(&self, session: &RefreshSession) -> Result<()> {
        sqlx::query(
            "INSERT INTO refresh_sessions (jti, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.jti)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn exists(&self, user_id: &str, jti: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM refresh_sessions WHERE jti = ? AND user_id = ?")
                .bind(jti)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(found.is_some())
    }

    async fn rotate(&self, user_id: &str, old_jti: &str, next: &RefreshSession) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Conditional delete: a concurrent rotation of the same token loses here
        let removed = sqlx::query("DELETE FROM refresh_sessions WHERE jti = ? AND user_id = ?")
            .bind(old_jti)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if removed.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO refresh_sessions (jti, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&next.jti)
        .bind(&next.user_id)
        .bind(next.expires_at)
        .bind(next.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(true)
    }

    async fn revoke(&self, user_id: &str, jti: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE jti = ? AND user_id = ?")
            .bind(jti)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn prune_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
