use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateScheduleRequest, Schedule, SCHEDULE_STATUSES};
use crate::services::NotificationService;

#[derive(Debug, Clone)]
pub struct ScheduleService {
    db: PgPool,
    notifications: NotificationService,
}

impl ScheduleService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    pub async fn create_schedule(
        &self,
        coach_id: Uuid,
        request: CreateScheduleRequest,
    ) -> Result<Schedule> {
        if request.ends_at <= request.starts_at {
            anyhow::bail!("session must end after it starts");
        }

        let schedule = sqlx::query_as::<_, Schedule>(
            "INSERT INTO schedules (id, member_id, coach_id, title, location, starts_at,
                                    ends_at, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'scheduled')
             RETURNING id, member_id, coach_id, title, location, starts_at, ends_at,
                       status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(request.member_id)
        .bind(coach_id)
        .bind(&request.title)
        .bind(&request.location)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .fetch_one(&self.db)
        .await?;

        if let Err(err) = self
            .notifications
            .notify(
                request.member_id,
                "Session scheduled",
                &format!("\"{}\" on {}", schedule.title, schedule.starts_at.format("%Y-%m-%d %H:%M")),
            )
            .await
        {
            tracing::warn!(
                "failed to notify member {} of schedule: {}",
                request.member_id,
                err
            );
        }

        Ok(schedule)
    }

    pub async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<Schedule>> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT id, member_id, coach_id, title, location, starts_at, ends_at, status, created_at
             FROM schedules WHERE member_id = $1 ORDER BY starts_at DESC",
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(schedules)
    }

    pub async fn get_schedule(&self, schedule_id: Uuid) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(
            "SELECT id, member_id, coach_id, title, location, starts_at, ends_at, status, created_at
             FROM schedules WHERE id = $1",
        )
        .bind(schedule_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(schedule)
    }

    pub async fn update_status(&self, schedule_id: Uuid, status: &str) -> Result<Option<Schedule>> {
        if !SCHEDULE_STATUSES.contains(&status) {
            anyhow::bail!("invalid schedule status: {}", status);
        }

        let schedule = sqlx::query_as::<_, Schedule>(
            "UPDATE schedules SET status = $2 WHERE id = $1
             RETURNING id, member_id, coach_id, title, location, starts_at, ends_at,
                       status, created_at",
        )
        .bind(schedule_id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;

        Ok(schedule)
    }
}
