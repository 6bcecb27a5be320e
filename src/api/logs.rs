use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AccessControl, Discipline, UserSession};
use crate::error::ApiError;
use crate::models::{
    CreateMealLogRequest, CreateWeightLogRequest, CreateWorkoutLogRequest, LogRangeQuery,
    MealLogDetail, WeightLog, WorkoutLogDetail, MEAL_TYPES,
};
use crate::services::LogService;

#[derive(Clone)]
pub struct LogsState {
    pub access: AccessControl,
    pub logs: LogService,
}

pub fn log_routes(db: PgPool) -> Router {
    let state = LogsState {
        access: AccessControl::new(db.clone()),
        logs: LogService::new(db),
    };

    Router::new()
        .route("/:member_id/meal-logs", get(list_meal_logs).post(create_meal_log))
        .route(
            "/:member_id/workout-logs",
            get(list_workout_logs).post(create_workout_log),
        )
        .route(
            "/:member_id/weight-logs",
            get(list_weight_logs).post(create_weight_log),
        )
        .with_state(state)
}

#[tracing::instrument(skip(state, session, query))]
async fn list_meal_logs(
    State(state): State<LogsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<LogRangeQuery>,
) -> Result<Json<Vec<MealLogDetail>>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Diet)
        .await?;

    let logs = state.logs.list_meal_logs(member_id, &query).await?;
    Ok(Json(logs))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_meal_log(
    State(state): State<LogsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateMealLogRequest>,
) -> Result<Json<MealLogDetail>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    if !MEAL_TYPES.contains(&request.meal_type.as_str()) {
        return Err(ApiError::Validation(format!(
            "invalid meal_type: {}",
            request.meal_type
        )));
    }

    let log = state.logs.create_meal_log(member_id, request).await?;
    Ok(Json(log))
}

#[tracing::instrument(skip(state, session, query))]
async fn list_workout_logs(
    State(state): State<LogsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<LogRangeQuery>,
) -> Result<Json<Vec<WorkoutLogDetail>>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::Workout)
        .await?;

    let logs = state.logs.list_workout_logs(member_id, &query).await?;
    Ok(Json(logs))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_workout_log(
    State(state): State<LogsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateWorkoutLogRequest>,
) -> Result<Json<WorkoutLogDetail>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    let log = state.logs.create_workout_log(member_id, request).await?;
    Ok(Json(log))
}

#[tracing::instrument(skip(state, session, query))]
async fn list_weight_logs(
    State(state): State<LogsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<LogRangeQuery>,
) -> Result<Json<Vec<WeightLog>>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::General)
        .await?;

    let logs = state.logs.list_weight_logs(member_id, &query).await?;
    Ok(Json(logs))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_weight_log(
    State(state): State<LogsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateWeightLogRequest>,
) -> Result<Json<WeightLog>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    if request.weight_kg <= 0.0 || request.weight_kg > 650.0 {
        return Err(ApiError::Validation("weight_kg out of range".to_string()));
    }

    let log = state.logs.create_weight_log(member_id, request).await?;
    Ok(Json(log))
}
