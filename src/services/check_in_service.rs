use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Discipline;
use crate::models::CheckIn;
use crate::services::NotificationService;

#[derive(Debug, Clone)]
pub struct CheckInService {
    db: PgPool,
    notifications: NotificationService,
}

impl CheckInService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    pub async fn create_check_in(
        &self,
        member_id: Uuid,
        coach_id: Uuid,
        discipline: Discipline,
        note: &str,
    ) -> Result<CheckIn> {
        let check_in = sqlx::query_as::<_, CheckIn>(
            "INSERT INTO member_check_ins (id, member_id, coach_id, discipline, note)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, member_id, coach_id, discipline, note, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(coach_id)
        .bind(discipline.as_str())
        .bind(note)
        .fetch_one(&self.db)
        .await?;

        if let Err(err) = self
            .notifications
            .notify(member_id, "New coach check-in", note)
            .await
        {
            tracing::warn!("failed to notify member {} of check-in: {}", member_id, err);
        }

        Ok(check_in)
    }

    pub async fn list_check_ins(&self, member_id: Uuid) -> Result<Vec<CheckIn>> {
        let check_ins = sqlx::query_as::<_, CheckIn>(
            "SELECT id, member_id, coach_id, discipline, note, created_at
             FROM member_check_ins WHERE member_id = $1
             ORDER BY created_at DESC",
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(check_ins)
    }
}
