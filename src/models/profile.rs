use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Member profile, 1:1 with a member user. The free-text intake fields feed
/// the default-plan heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberProfile {
    pub member_id: Uuid,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub activity_level: Option<String>,
    pub goal_text: Option<String>,
    pub target_calories: Option<i32>,
    pub dietary_notes: Option<String>,
    pub medical_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub activity_level: Option<String>,
    pub goal_text: Option<String>,
    pub target_calories: Option<i32>,
    pub dietary_notes: Option<String>,
    pub medical_notes: Option<String>,
}
