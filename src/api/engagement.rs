use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AccessControl, Discipline, UserRole, UserSession};
use crate::error::ApiError;
use crate::models::{CheckIn, CreateCheckInRequest, CreateMessageRequest, PlanMessage, Schedule};
use crate::services::{CheckInService, EmailService, MessageService, NotificationService, ScheduleService};

#[derive(Clone)]
pub struct EngagementState {
    pub access: AccessControl,
    pub check_ins: CheckInService,
    pub messages: MessageService,
    pub schedules: ScheduleService,
}

pub fn engagement_routes(db: PgPool, email: EmailService) -> Router {
    let notifications = NotificationService::new(db.clone(), email);
    let state = EngagementState {
        access: AccessControl::new(db.clone()),
        check_ins: CheckInService::new(db.clone(), notifications.clone()),
        messages: MessageService::new(db.clone(), notifications.clone()),
        schedules: ScheduleService::new(db, notifications),
    };

    Router::new()
        .route("/:member_id/check-ins", get(list_check_ins).post(create_check_in))
        .route("/:member_id/messages", get(list_messages).post(post_message))
        .route("/:member_id/schedules", get(list_member_schedules))
        .with_state(state)
}

#[tracing::instrument(skip(state, session))]
async fn list_check_ins(
    State(state): State<EngagementState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<CheckIn>>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::General)
        .await?;

    let check_ins = state.check_ins.list_check_ins(member_id).await?;
    Ok(Json(check_ins))
}

/// Record a coach check-in on a member. Coaches check in under their own
/// discipline; members cannot check in on themselves.
#[tracing::instrument(skip(state, session, request))]
async fn create_check_in(
    State(state): State<EngagementState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateCheckInRequest>,
) -> Result<Json<CheckIn>, ApiError> {
    if !session.role.is_coach() && session.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }
    state
        .access
        .authorize(&session, member_id, request.discipline)
        .await?;

    if request.note.trim().is_empty() {
        return Err(ApiError::Validation("check-in note cannot be empty".to_string()));
    }

    let check_in = state
        .check_ins
        .create_check_in(member_id, session.user_id, request.discipline, &request.note)
        .await?;

    Ok(Json(check_in))
}

#[derive(Debug, Deserialize)]
struct MessageListQuery {
    discipline: Option<Discipline>,
}

/// Without a `discipline` filter the list covers exactly the disciplines the
/// requester is authorized for, so an assigned trainer never sees the
/// nutritionist's diet thread.
#[tracing::instrument(skip(state, session, query))]
async fn list_messages(
    State(state): State<EngagementState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Vec<PlanMessage>>, ApiError> {
    let disciplines = match query.discipline {
        Some(discipline) => {
            state.access.authorize(&session, member_id, discipline).await?;
            vec![discipline]
        }
        None => state.access.authorize_visible(&session, member_id).await?,
    };

    let messages = state.messages.list_messages(member_id, &disciplines).await?;
    Ok(Json(messages))
}

#[tracing::instrument(skip(state, session, request))]
async fn post_message(
    State(state): State<EngagementState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<CreateMessageRequest>,
) -> Result<Json<PlanMessage>, ApiError> {
    state
        .access
        .authorize(&session, member_id, request.discipline)
        .await?;

    if request.body.trim().is_empty() {
        return Err(ApiError::Validation("message body cannot be empty".to_string()));
    }

    let message = state
        .messages
        .post_message(member_id, session.user_id, request.discipline, &request.body)
        .await?;

    Ok(Json(message))
}

#[tracing::instrument(skip(state, session))]
async fn list_member_schedules(
    State(state): State<EngagementState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::General)
        .await?;

    let schedules = state.schedules.list_for_member(member_id).await?;
    Ok(Json(schedules))
}
