use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AccessControl, Discipline, UserSession};
use crate::error::ApiError;
use crate::models::{
    CreateDietPlanRequest, CreateWorkoutPlanRequest, DietPlanDetail, WorkoutPlanDetail,
};
use crate::services::plan_generator;
use crate::services::{
    DietPlanService, EmailService, NotificationService, ProfileService, WorkoutPlanService,
};

#[derive(Clone)]
pub struct PlansState {
    pub access: AccessControl,
    pub profiles: ProfileService,
    pub diet_plans: DietPlanService,
    pub workout_plans: WorkoutPlanService,
}

pub fn plan_routes(db: PgPool, email: EmailService) -> Router {
    let notifications = NotificationService::new(db.clone(), email);
    let state = PlansState {
        access: AccessControl::new(db.clone()),
        profiles: ProfileService::new(db.clone()),
        diet_plans: DietPlanService::new(db.clone(), notifications.clone()),
        workout_plans: WorkoutPlanService::new(db, notifications),
    };

    Router::new()
        .route("/:member_id/diet-plan", get(get_diet_plan).post(create_diet_plan))
        .route("/:member_id/diet-plan/default", post(create_default_diet_plan))
        .route(
            "/:member_id/workout-plan",
            get(get_workout_plan).post(create_workout_plan),
        )
        .route(
            "/:member_id/workout-plan/default",
            post(create_default_workout_plan),
        )
        .with_state(state)
}

#[tracing::instrument(skip(state, session))]
async fn get_diet_plan(
    State(state): State<PlansState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<DietPlanDetail>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Diet)
        .await?;

    let plan = state
        .diet_plans
        .get_active_plan(member_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(plan))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_diet_plan(
    State(state): State<PlansState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateDietPlanRequest>,
) -> Result<Json<DietPlanDetail>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Diet)
        .await?;
    validate_diet_plan(&request)?;

    let plan = state
        .diet_plans
        .create_plan(member_id, session.user_id, request)
        .await?;

    Ok(Json(plan))
}

/// Generate a default diet plan from the member's stored profile. Requires
/// a profile with a recorded weight, since protein scales with body weight.
#[tracing::instrument(skip(state, session))]
async fn create_default_diet_plan(
    State(state): State<PlansState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<DietPlanDetail>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Diet)
        .await?;

    let profile = state
        .profiles
        .get_profile(member_id)
        .await?
        .ok_or_else(|| ApiError::Validation("member has no profile".to_string()))?;
    let weight = profile
        .weight_kg
        .ok_or_else(|| ApiError::Validation("profile has no recorded weight".to_string()))?;

    let goal_text = profile.goal_text.as_deref().unwrap_or("");
    let split = plan_generator::derive_macro_split(goal_text, weight, profile.target_calories);
    let request = plan_generator::default_diet_plan(goal_text, split);

    let plan = state
        .diet_plans
        .create_plan(member_id, session.user_id, request)
        .await?;

    Ok(Json(plan))
}

#[tracing::instrument(skip(state, session))]
async fn get_workout_plan(
    State(state): State<PlansState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<WorkoutPlanDetail>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Workout)
        .await?;

    let plan = state
        .workout_plans
        .get_active_plan(member_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(plan))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_workout_plan(
    State(state): State<PlansState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateWorkoutPlanRequest>,
) -> Result<Json<WorkoutPlanDetail>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Workout)
        .await?;
    validate_workout_plan(&request)?;

    let plan = state
        .workout_plans
        .create_plan(member_id, session.user_id, request)
        .await?;

    Ok(Json(plan))
}

#[tracing::instrument(skip(state, session))]
async fn create_default_workout_plan(
    State(state): State<PlansState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<WorkoutPlanDetail>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Workout)
        .await?;

    let profile = state
        .profiles
        .get_profile(member_id)
        .await?
        .ok_or_else(|| ApiError::Validation("member has no profile".to_string()))?;

    let goal_text = profile.goal_text.as_deref().unwrap_or("");
    let request = plan_generator::default_workout_plan(goal_text);

    let plan = state
        .workout_plans
        .create_plan(member_id, session.user_id, request)
        .await?;

    Ok(Json(plan))
}

fn validate_diet_plan(request: &CreateDietPlanRequest) -> Result<(), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("plan title cannot be empty".to_string()));
    }
    if !(800..=10_000).contains(&request.calories) {
        return Err(ApiError::Validation("calories out of range".to_string()));
    }
    if request.protein_g < 0 || request.carbs_g < 0 || request.fat_g < 0 {
        return Err(ApiError::Validation("macros cannot be negative".to_string()));
    }
    Ok(())
}

fn validate_workout_plan(request: &CreateWorkoutPlanRequest) -> Result<(), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("plan title cannot be empty".to_string()));
    }
    for day in &request.days {
        if !(0..=6).contains(&day.day_of_week) {
            return Err(ApiError::Validation(format!(
                "day_of_week must be 0-6, got {}",
                day.day_of_week
            )));
        }
    }
    Ok(())
}
