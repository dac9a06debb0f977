// SQLite ActivityLogRepository Implementation

use crate::error::map_sqlx_error;
use crate::sql::{contains_pattern, decode_json, encode_json};
use async_trait::async_trait;
use folio_core::domain::{ActivityFilter, ActivityLog, ActivityLogView, HttpMethod, UserRef};
use folio_core::error::{AppError, Result};
use folio_core::port::ActivityLogRepository;
use sqlx::SqlitePool;

/// ?1 search, ?2 action, ?3 resource, ?4 user id, ?5 start, ?6 end
const QUERY_FILTER: &str = r#"
    (?1 IS NULL
     OR lower(coalesce(a.email, '')) LIKE ?1 ESCAPE '\'
     OR lower(a.path) LIKE ?1 ESCAPE '\'
     OR lower(a.resource) LIKE ?1 ESCAPE '\')
    AND (?2 IS NULL OR a.action = ?2)
    AND (?3 IS NULL OR a.resource = ?3)
    AND (?4 IS NULL OR a.user_id = ?4)
    AND (?5 IS NULL OR a.timestamp >= ?5)
    AND (?6 IS NULL OR a.timestamp <= ?6)
"#;

pub struct SqliteActivityLogRepository {
    pool: SqlitePool,
}

impl SqliteActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogRepository for SqliteActivityLogRepository {
    async fn insert(&self, log: &ActivityLog) -> Result<()> {
        let details = log.details.as_ref().map(encode_json).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                id, user_id, email, action, resource, resource_id, method, path,
                status_code, ip_address, user_agent, details, duration_ms, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.email)
        .bind(log.action.as_str())
        .bind(log.resource.as_str())
        .bind(&log.resource_id)
        .bind(log.method.as_str())
        .bind(&log.path)
        .bind(log.status_code as i64)
        .bind(&log.ip_address)
        .bind(&log.user_agent)
        .bind(details)
        .bind(log.duration_ms)
        .bind(log.timestamp)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn query(&self, filter: &ActivityFilter) -> Result<(Vec<ActivityLogView>, i64)> {
        let search = contains_pattern(filter.search.as_deref());
        let action = filter.action.map(|a| a.as_str());
        let resource = filter.resource.map(|r| r.as_str());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM activity_logs a WHERE {}",
            QUERY_FILTER
        ))
        .bind(&search)
        .bind(action)
        .bind(resource)
        .bind(&filter.user_id)
        .bind(filter.start)
        .bind(filter.end)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            r#"
            SELECT a.*, u.email AS user_email
            FROM activity_logs a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE {}
            ORDER BY a.timestamp DESC, a.id DESC
            LIMIT ?7 OFFSET ?8
            "#,
            QUERY_FILTER
        ))
        .bind(&search)
        .bind(action)
        .bind(resource)
        .bind(&filter.user_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.page.limit as i64)
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(ActivityRow::into_view)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: String,
    user_id: Option<String>,
    email: Option<String>,
    action: String,
    resource: String,
    resource_id: Option<String>,
    method: String,
    path: String,
    status_code: i64,
    ip_address: Option<String>,
    user_agent: Option<String>,
    details: Option<String>,
    duration_ms: Option<i64>,
    timestamp: i64,
    user_email: Option<String>,
}

impl ActivityRow {
    fn into_view(self) -> Result<ActivityLogView> {
        let method = HttpMethod::parse(&self.method)
            .ok_or_else(|| AppError::Database(format!("Unknown HTTP method: {}", self.method)))?;
        let user = match (&self.user_id, self.user_email) {
            (Some(id), Some(email)) => Some(UserRef {
                id: id.clone(),
                email,
            }),
            _ => None,
        };

        Ok(ActivityLogView {
            log: ActivityLog {
                id: self.id,
                user_id: self.user_id,
                email: self.email,
                action: self.action.parse()?,
                resource: self.resource.parse()?,
                resource_id: self.resource_id,
                method,
                path: self.path,
                status_code: u16::try_from(self.status_code).unwrap_or_default(),
                ip_address: self.ip_address,
                user_agent: self.user_agent,
                details: self
                    .details
                    .as_deref()
                    .map(|raw| decode_json("details", raw))
                    .transpose()?,
                duration_ms: self.duration_ms,
                timestamp: self.timestamp,
            },
            user,
        })
    }
}
