use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DietPlan {
    pub id: Uuid,
    pub member_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DietPlanMeal {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub time_of_day: Option<String>,
    pub target_calories: Option<i32>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DietPlanMealItem {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
    pub position: i32,
}

/// A plan with its meals and items resolved
#[derive(Debug, Serialize)]
pub struct DietPlanDetail {
    pub plan: DietPlan,
    pub meals: Vec<DietPlanMealDetail>,
}

#[derive(Debug, Serialize)]
pub struct DietPlanMealDetail {
    pub meal: DietPlanMeal,
    pub items: Vec<DietPlanMealItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDietPlanRequest {
    pub title: String,
    pub calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub meals: Vec<CreateDietPlanMeal>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDietPlanMeal {
    pub name: String,
    pub time_of_day: Option<String>,
    pub target_calories: Option<i32>,
    pub items: Vec<CreateDietPlanMealItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDietPlanMealItem {
    pub food_name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
}
