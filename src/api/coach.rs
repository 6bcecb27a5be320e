use axum::{extract::State, response::Json, routing::get, Extension, Router};
use sqlx::PgPool;

use crate::auth::UserSession;
use crate::error::ApiError;
use crate::models::AssignedMember;
use crate::services::{AssignmentService, EmailService, NotificationService};

#[derive(Clone)]
pub struct CoachState {
    pub assignments: AssignmentService,
}

pub fn coach_routes(db: PgPool, email: EmailService) -> Router {
    let notifications = NotificationService::new(db.clone(), email);
    let state = CoachState {
        assignments: AssignmentService::new(db, notifications),
    };

    Router::new().route("/members", get(list_members)).with_state(state)
}

/// Members assigned to the calling coach.
#[tracing::instrument(skip(state, session))]
async fn list_members(
    State(state): State<CoachState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<Vec<AssignedMember>>, ApiError> {
    if !session.role.is_coach() {
        return Err(ApiError::Forbidden);
    }

    let members = state
        .assignments
        .list_members_for_coach(session.user_id, session.role)
        .await?;

    Ok(Json(members))
}
