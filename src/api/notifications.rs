use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::ApiError;
use crate::models::{Notification, NotificationQuery};
use crate::services::{EmailService, NotificationService};

#[derive(Clone)]
pub struct NotificationsState {
    pub notifications: NotificationService,
}

pub fn notification_routes(db: PgPool, email: EmailService) -> Router {
    let state = NotificationsState {
        notifications: NotificationService::new(db, email),
    };

    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", post(mark_read))
        .with_state(state)
}

/// Notifications are always scoped to the session user, so no member-level
/// access check applies here.
#[tracing::instrument(skip(state, session, query))]
async fn list_notifications(
    State(state): State<NotificationsState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state.notifications.list(session.user_id, query).await?;
    Ok(Json(notifications))
}

#[tracing::instrument(skip(state, session))]
async fn mark_read(
    State(state): State<NotificationsState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.notifications.mark_read(id, session.user_id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "read": true })))
}
