use axum::{
    extract::{Path, State},
    response::Json,
    routing::{post, put},
    Extension, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AccessControl, Discipline, UserRole, UserSession};
use crate::error::ApiError;
use crate::models::{CreateScheduleRequest, Schedule, UpdateScheduleStatusRequest, SCHEDULE_STATUSES};
use crate::services::{EmailService, NotificationService, ScheduleService};

#[derive(Clone)]
pub struct SchedulesState {
    pub access: AccessControl,
    pub schedules: ScheduleService,
}

pub fn schedule_routes(db: PgPool, email: EmailService) -> Router {
    let notifications = NotificationService::new(db.clone(), email);
    let state = SchedulesState {
        access: AccessControl::new(db.clone()),
        schedules: ScheduleService::new(db, notifications),
    };

    Router::new()
        .route("/", post(create_schedule))
        .route("/:id/status", put(update_status))
        .with_state(state)
}

/// Book a session with a member. Only coaches assigned to the member (or an
/// admin) can book.
#[tracing::instrument(skip(state, session, request))]
async fn create_schedule(
    State(state): State<SchedulesState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<Schedule>, ApiError> {
    if !session.role.is_coach() && session.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }
    state
        .access
        .authorize(&session, request.member_id, Discipline::General)
        .await?;

    if request.ends_at <= request.starts_at {
        return Err(ApiError::Validation(
            "session must end after it starts".to_string(),
        ));
    }
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("title cannot be empty".to_string()));
    }

    let schedule = state.schedules.create_schedule(session.user_id, request).await?;
    Ok(Json(schedule))
}

/// Move a session between scheduled / completed / cancelled. The booking
/// coach, the member, or an admin may change it.
#[tracing::instrument(skip(state, session, request))]
async fn update_status(
    State(state): State<SchedulesState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateScheduleStatusRequest>,
) -> Result<Json<Schedule>, ApiError> {
    if !SCHEDULE_STATUSES.contains(&request.status.as_str()) {
        return Err(ApiError::Validation(format!(
            "invalid status: {}",
            request.status
        )));
    }

    let schedule = state
        .schedules
        .get_schedule(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let allowed = session.user_id == schedule.coach_id
        || session.user_id == schedule.member_id
        || session.role == UserRole::Admin;
    if !allowed {
        return Err(ApiError::Forbidden);
    }

    let updated = state
        .schedules
        .update_status(id, &request.status)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(updated))
}
