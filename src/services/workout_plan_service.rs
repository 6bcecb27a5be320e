use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    CreateWorkoutPlanRequest, WorkoutPlan, WorkoutPlanDay, WorkoutPlanDayDetail,
    WorkoutPlanDetail, WorkoutPlanExercise,
};
use crate::services::NotificationService;

#[derive(Debug, Clone)]
pub struct WorkoutPlanService {
    db: PgPool,
    notifications: NotificationService,
}

impl WorkoutPlanService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Create a plan and make it the member's single active one; the prior
    /// active plan is deactivated in the same transaction.
    pub async fn create_plan(
        &self,
        member_id: Uuid,
        created_by: Uuid,
        request: CreateWorkoutPlanRequest,
    ) -> Result<WorkoutPlanDetail> {
        for day in &request.days {
            if !(0..7).contains(&day.day_of_week) {
                anyhow::bail!("day_of_week must be 0..=6, got {}", day.day_of_week);
            }
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE workout_plans SET is_active = false WHERE member_id = $1 AND is_active",
        )
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

        let plan = sqlx::query_as::<_, WorkoutPlan>(
            "INSERT INTO workout_plans (id, member_id, created_by, title, is_active)
             VALUES ($1, $2, $3, $4, true)
             RETURNING id, member_id, created_by, title, is_active, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(created_by)
        .bind(&request.title)
        .fetch_one(&mut *tx)
        .await?;

        let mut days = Vec::with_capacity(request.days.len());
        for (day_pos, day_req) in request.days.into_iter().enumerate() {
            let day = sqlx::query_as::<_, WorkoutPlanDay>(
                "INSERT INTO workout_plan_days (id, plan_id, day_of_week, focus, position)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, plan_id, day_of_week, focus, position",
            )
            .bind(Uuid::new_v4())
            .bind(plan.id)
            .bind(day_req.day_of_week)
            .bind(&day_req.focus)
            .bind(day_pos as i32)
            .fetch_one(&mut *tx)
            .await?;

            let mut exercises = Vec::with_capacity(day_req.exercises.len());
            for (pos, exercise) in day_req.exercises.into_iter().enumerate() {
                let exercise = sqlx::query_as::<_, WorkoutPlanExercise>(
                    "INSERT INTO workout_plan_exercises (id, day_id, name, sets, reps,
                                                         rest_seconds, notes, position)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                     RETURNING id, day_id, name, sets, reps, rest_seconds, notes, position",
                )
                .bind(Uuid::new_v4())
                .bind(day.id)
                .bind(&exercise.name)
                .bind(exercise.sets)
                .bind(exercise.reps)
                .bind(exercise.rest_seconds)
                .bind(&exercise.notes)
                .bind(pos as i32)
                .fetch_one(&mut *tx)
                .await?;
                exercises.push(exercise);
            }

            days.push(WorkoutPlanDayDetail { day, exercises });
        }

        tx.commit().await?;

        if created_by != member_id {
            if let Err(err) = self
                .notifications
                .notify(
                    member_id,
                    "New workout plan",
                    &format!("A new workout plan \"{}\" is now active.", plan.title),
                )
                .await
            {
                tracing::warn!("failed to notify member {} of new plan: {}", member_id, err);
            }
        }

        Ok(WorkoutPlanDetail { plan, days })
    }

    pub async fn get_active_plan(&self, member_id: Uuid) -> Result<Option<WorkoutPlanDetail>> {
        let plan = sqlx::query_as::<_, WorkoutPlan>(
            "SELECT id, member_id, created_by, title, is_active, created_at
             FROM workout_plans WHERE member_id = $1 AND is_active",
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(plan) = plan else {
            return Ok(None);
        };

        let days = sqlx::query_as::<_, WorkoutPlanDay>(
            "SELECT id, plan_id, day_of_week, focus, position
             FROM workout_plan_days WHERE plan_id = $1 ORDER BY position",
        )
        .bind(plan.id)
        .fetch_all(&self.db)
        .await?;

        let mut detail_days = Vec::with_capacity(days.len());
        for day in days {
            let exercises = sqlx::query_as::<_, WorkoutPlanExercise>(
                "SELECT id, day_id, name, sets, reps, rest_seconds, notes, position
                 FROM workout_plan_exercises WHERE day_id = $1 ORDER BY position",
            )
            .bind(day.id)
            .fetch_all(&self.db)
            .await?;
            detail_days.push(WorkoutPlanDayDetail { day, exercises });
        }

        Ok(Some(WorkoutPlanDetail {
            plan,
            days: detail_days,
        }))
    }
}
