use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AccessControl, Discipline, UserSession};
use crate::error::ApiError;
use crate::models::{CreateGoalRequest, MemberGoal, UpdateGoalRequest};
use crate::services::GoalService;

#[derive(Clone)]
pub struct GoalsState {
    pub access: AccessControl,
    pub goals: GoalService,
}

pub fn goals_routes(db: PgPool) -> Router {
    let state = GoalsState {
        access: AccessControl::new(db.clone()),
        goals: GoalService::new(db),
    };

    Router::new()
        .route("/:member_id/goals", get(list_goals).post(create_goal))
        .route(
            "/:member_id/goals/:goal_id",
            put(update_goal).delete(delete_goal),
        )
        .with_state(state)
}

#[tracing::instrument(skip(state, session))]
async fn list_goals(
    State(state): State<GoalsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<MemberGoal>>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::General)
        .await?;

    let goals = state.goals.list_goals(member_id).await?;
    Ok(Json(goals))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_goal(
    State(state): State<GoalsState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateGoalRequest>,
) -> Result<Json<MemberGoal>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("Goal title cannot be empty".to_string()));
    }

    let goal = state.goals.create_goal(member_id, request).await?;
    Ok(Json(goal))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_goal(
    State(state): State<GoalsState>,
    Extension(session): Extension<UserSession>,
    Path((member_id, goal_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGoalRequest>,
) -> Result<Json<MemberGoal>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    if let Some(status) = &request.status {
        if !crate::models::GOAL_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::Validation(format!("invalid status: {}", status)));
        }
    }

    let goal = state
        .goals
        .update_goal(goal_id, member_id, request)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(goal))
}

#[tracing::instrument(skip(state, session))]
async fn delete_goal(
    State(state): State<GoalsState>,
    Extension(session): Extension<UserSession>,
    Path((member_id, goal_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    if !state.goals.delete_goal(goal_id, member_id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
