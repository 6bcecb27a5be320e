use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side audit trail row, surfaced on the admin dashboard
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SystemLog {
    pub id: Uuid,
    pub level: String,
    pub event: String,
    pub detail: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SystemLogQuery {
    pub level: Option<String>,
    pub event: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
