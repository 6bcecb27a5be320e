use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Discipline;

/// A coach's periodic note on an assigned member
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub member_id: Uuid,
    pub coach_id: Uuid,
    pub discipline: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCheckInRequest {
    pub discipline: Discipline,
    pub note: String,
}

/// Message in a member/coach thread, scoped by discipline
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlanMessage {
    pub id: Uuid,
    pub member_id: Uuid,
    pub sender_id: Uuid,
    pub discipline: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub discipline: Discipline,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub member_id: Uuid,
    pub coach_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub member_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleStatusRequest {
    pub status: String,
}

pub const SCHEDULE_STATUSES: [&str; 3] = ["scheduled", "completed", "cancelled"];
