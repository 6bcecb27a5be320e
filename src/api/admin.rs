use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::ApiError;
use crate::metrics::{HourlyPoint, MetricsRegistry};
use crate::models::{
    Assignment, ListUsersQuery, SystemLog, SystemLogQuery, UpdateRoleRequest,
    UpsertAssignmentRequest, UserSummary,
};
use crate::services::{
    AssignmentService, BackupResult, BackupService, EmailService, NotificationService,
    SystemLogService, UserService,
};

#[derive(Clone)]
pub struct AdminState {
    pub users: UserService,
    pub assignments: AssignmentService,
    pub audit: SystemLogService,
    pub backup: BackupService,
    pub metrics: MetricsRegistry,
}

pub fn admin_routes(
    db: PgPool,
    email: EmailService,
    metrics: MetricsRegistry,
    database_url: String,
    backup_dir: String,
) -> Router {
    let notifications = NotificationService::new(db.clone(), email);
    let audit = SystemLogService::new(db.clone());
    let state = AdminState {
        users: UserService::new(db.clone()),
        assignments: AssignmentService::new(db, notifications),
        backup: BackupService::new(database_url, backup_dir, audit.clone()),
        audit,
        metrics,
    };

    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", put(update_role))
        .route("/users/:id", axum::routing::delete(delete_user))
        .route("/assignments", put(upsert_assignment))
        .route("/monitor", get(monitor))
        .route("/system-logs", get(system_logs))
        .route("/backup", post(run_backup))
        .with_state(state)
}

#[tracing::instrument(skip(state, query))]
async fn list_users(
    State(state): State<AdminState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.users.list_users(query).await?;
    Ok(Json(users))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_role(
    State(state): State<AdminState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let user = state
        .users
        .update_role(id, request.role, session.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user))
}

/// Remove a user and all their dependent rows. Admins cannot delete
/// themselves, which keeps at least the acting account alive.
#[tracing::instrument(skip(state, session))]
async fn delete_user(
    State(state): State<AdminState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if id == session.user_id {
        return Err(ApiError::Validation(
            "cannot delete your own account".to_string(),
        ));
    }

    if !state.users.delete_user(id, session.user_id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[tracing::instrument(skip(state, session, request))]
async fn upsert_assignment(
    State(state): State<AdminState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<UpsertAssignmentRequest>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = state
        .assignments
        .upsert_assignment(
            request.member_id,
            request.coach_id,
            request.discipline,
            session.user_id,
        )
        .await?;

    Ok(Json(assignment))
}

#[derive(Debug, serde::Serialize)]
struct MonitorResponse {
    total_requests: u64,
    hourly: Vec<HourlyPoint>,
}

#[tracing::instrument(skip(state))]
async fn monitor(State(state): State<AdminState>) -> Json<MonitorResponse> {
    Json(MonitorResponse {
        total_requests: state.metrics.total_requests(),
        hourly: state.metrics.hourly_points(Utc::now()),
    })
}

#[tracing::instrument(skip(state, query))]
async fn system_logs(
    State(state): State<AdminState>,
    Query(query): Query<SystemLogQuery>,
) -> Result<Json<Vec<SystemLog>>, ApiError> {
    let logs = state.audit.list(query).await?;
    Ok(Json(logs))
}

#[tracing::instrument(skip(state, session))]
async fn run_backup(
    State(state): State<AdminState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<BackupResult>, ApiError> {
    let result = state.backup.run_backup(session.user_id).await?;
    Ok(Json(result))
}
