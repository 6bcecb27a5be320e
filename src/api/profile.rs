use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AccessControl, Discipline, UserSession};
use crate::error::ApiError;
use crate::models::{MemberProfile, SaveProfileRequest};
use crate::services::ProfileService;

#[derive(Clone)]
pub struct ProfileState {
    pub access: AccessControl,
    pub profiles: ProfileService,
}

pub fn profile_routes(db: PgPool) -> Router {
    let state = ProfileState {
        access: AccessControl::new(db.clone()),
        profiles: ProfileService::new(db),
    };

    Router::new()
        .route("/:member_id/profile", get(get_profile).put(save_profile))
        .with_state(state)
}

#[tracing::instrument(skip(state, session))]
async fn get_profile(
    State(state): State<ProfileState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberProfile>, ApiError> {
    state
        .access
        .authorize(&session, member_id, Discipline::General)
        .await?;

    let profile = state
        .profiles
        .get_profile(member_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(profile))
}

/// Save the member profile. Coaches may read profiles but only the member
/// (or an admin) writes them.
#[tracing::instrument(skip(state, session, request))]
async fn save_profile(
    State(state): State<ProfileState>,
    Extension(session): Extension<UserSession>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<SaveProfileRequest>,
) -> Result<Json<MemberProfile>, ApiError> {
    state.access.authorize_owner_write(&session, member_id)?;

    if let Some(weight) = request.weight_kg {
        if weight <= 0.0 || weight > 650.0 {
            return Err(ApiError::Validation("weight_kg out of range".to_string()));
        }
    }
    if let Some(calories) = request.target_calories {
        if !(800..=10_000).contains(&calories) {
            return Err(ApiError::Validation(
                "target_calories out of range".to_string(),
            ));
        }
    }

    let profile = state.profiles.save_profile(member_id, request).await?;
    Ok(Json(profile))
}
