use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Member-owned, append-only logs. Coaches and admins read them through the
// access predicate; only the member writes.

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealLog {
    pub id: Uuid,
    pub member_id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub meal_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealLogItem {
    pub id: Uuid,
    pub log_id: Uuid,
    pub food_name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MealLogDetail {
    pub log: MealLog,
    pub items: Vec<MealLogItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealLogRequest {
    pub logged_at: Option<DateTime<Utc>>,
    pub meal_type: String,
    pub notes: Option<String>,
    pub items: Vec<CreateMealLogItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealLogItem {
    pub food_name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub member_id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutLogItem {
    pub id: Uuid,
    pub log_id: Uuid,
    pub exercise_name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight_kg: Option<f64>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutLogDetail {
    pub log: WorkoutLog,
    pub items: Vec<WorkoutLogItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutLogRequest {
    pub logged_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub items: Vec<CreateWorkoutLogItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutLogItem {
    pub exercise_name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight_kg: Option<f64>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightLog {
    pub id: Uuid,
    pub member_id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub weight_kg: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateWeightLogRequest {
    pub logged_at: Option<DateTime<Utc>>,
    pub weight_kg: f64,
}

#[derive(Debug, Deserialize)]
pub struct LogRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];
