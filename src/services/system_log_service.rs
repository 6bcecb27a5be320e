use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{SystemLog, SystemLogQuery};

/// Persisted audit trail. Recording never fails the surrounding request; a
/// failed insert is logged and dropped.
#[derive(Debug, Clone)]
pub struct SystemLogService {
    db: PgPool,
}

impl SystemLogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn record(&self, level: &str, event: &str, detail: &str, user_id: Option<Uuid>) {
        let result = sqlx::query(
            "INSERT INTO system_logs (id, level, event, detail, user_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(level)
        .bind(event)
        .bind(detail)
        .bind(user_id)
        .execute(&self.db)
        .await;

        if let Err(err) = result {
            tracing::warn!("failed to record system log {}: {}", event, err);
        }
    }

    pub async fn list(&self, query: SystemLogQuery) -> anyhow::Result<Vec<SystemLog>> {
        let limit = query.limit.unwrap_or(100).min(500);
        let offset = query.offset.unwrap_or(0);

        let logs = sqlx::query_as::<_, SystemLog>(
            "SELECT id, level, event, detail, user_id, created_at
             FROM system_logs
             WHERE ($1::text IS NULL OR level = $1)
               AND ($2::text IS NULL OR event = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(query.level)
        .bind(query.event)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }
}
