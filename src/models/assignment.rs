use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Discipline;

/// A coach-to-member link. One row per member per discipline, maintained by
/// upsert-on-conflict.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub member_id: Uuid,
    pub coach_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertAssignmentRequest {
    pub member_id: Uuid,
    pub coach_id: Uuid,
    pub discipline: Discipline,
}

/// Row returned when a coach lists their members
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignedMember {
    pub member_id: Uuid,
    pub email: String,
    pub assigned_at: DateTime<Utc>,
}
