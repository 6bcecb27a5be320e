use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{MemberProfile, SaveProfileRequest};

#[derive(Debug, Clone)]
pub struct ProfileService {
    db: PgPool,
}

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, member_id: Uuid) -> Result<Option<MemberProfile>> {
        let profile = sqlx::query_as::<_, MemberProfile>(
            "SELECT member_id, height_cm, weight_kg, date_of_birth, sex, activity_level,
                    goal_text, target_calories, dietary_notes, medical_notes,
                    created_at, updated_at
             FROM member_profiles WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    /// Upsert the profile. Saving a new weight also appends a weight log row;
    /// both writes happen in one transaction.
    pub async fn save_profile(
        &self,
        member_id: Uuid,
        request: SaveProfileRequest,
    ) -> Result<MemberProfile> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        // Read the old weight under a row lock so two concurrent saves of the
        // same new weight cannot both see the stale value and double-append.
        let previous_weight: Option<f64> = sqlx::query_scalar(
            "SELECT weight_kg FROM member_profiles WHERE member_id = $1 FOR UPDATE",
        )
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?
        .flatten();

        let profile = sqlx::query_as::<_, MemberProfile>(
            "INSERT INTO member_profiles (
                member_id, height_cm, weight_kg, date_of_birth, sex, activity_level,
                goal_text, target_calories, dietary_notes, medical_notes, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             ON CONFLICT (member_id) DO UPDATE SET
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                date_of_birth = EXCLUDED.date_of_birth,
                sex = EXCLUDED.sex,
                activity_level = EXCLUDED.activity_level,
                goal_text = EXCLUDED.goal_text,
                target_calories = EXCLUDED.target_calories,
                dietary_notes = EXCLUDED.dietary_notes,
                medical_notes = EXCLUDED.medical_notes,
                updated_at = EXCLUDED.updated_at
             RETURNING member_id, height_cm, weight_kg, date_of_birth, sex, activity_level,
                       goal_text, target_calories, dietary_notes, medical_notes,
                       created_at, updated_at",
        )
        .bind(member_id)
        .bind(request.height_cm)
        .bind(request.weight_kg)
        .bind(request.date_of_birth)
        .bind(request.sex)
        .bind(request.activity_level)
        .bind(request.goal_text)
        .bind(request.target_calories)
        .bind(request.dietary_notes)
        .bind(request.medical_notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(weight) = profile.weight_kg {
            if previous_weight != Some(weight) {
                sqlx::query(
                    "INSERT INTO weight_logs (id, member_id, logged_at, weight_kg)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(Uuid::new_v4())
                .bind(member_id)
                .bind(now)
                .bind(weight)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(profile)
    }
}
