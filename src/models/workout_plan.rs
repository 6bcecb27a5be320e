use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub member_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutPlanDay {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub day_of_week: i32,
    pub focus: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutPlanExercise {
    pub id: Uuid,
    pub day_id: Uuid,
    pub name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
    pub position: i32,
}

#[derive(Debug, Serialize)]
pub struct WorkoutPlanDetail {
    pub plan: WorkoutPlan,
    pub days: Vec<WorkoutPlanDayDetail>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutPlanDayDetail {
    pub day: WorkoutPlanDay,
    pub exercises: Vec<WorkoutPlanExercise>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutPlanRequest {
    pub title: String,
    pub days: Vec<CreateWorkoutPlanDay>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutPlanDay {
    pub day_of_week: i32,
    pub focus: Option<String>,
    pub exercises: Vec<CreateWorkoutPlanExercise>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutPlanExercise {
    pub name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
}
