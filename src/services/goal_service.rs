use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateGoalRequest, MemberGoal, UpdateGoalRequest, GOAL_STATUSES};

#[derive(Debug, Clone)]
pub struct GoalService {
    db: PgPool,
}

impl GoalService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_goal(
        &self,
        member_id: Uuid,
        request: CreateGoalRequest,
    ) -> Result<MemberGoal> {
        let now = Utc::now();
        let goal = sqlx::query_as::<_, MemberGoal>(
            "INSERT INTO member_goals (id, member_id, title, description, target_value, unit,
                                       target_date, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8, $8)
             RETURNING id, member_id, title, description, target_value, unit, target_date,
                       status, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.target_value)
        .bind(request.unit)
        .bind(request.target_date)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(goal)
    }

    pub async fn list_goals(&self, member_id: Uuid) -> Result<Vec<MemberGoal>> {
        let goals = sqlx::query_as::<_, MemberGoal>(
            "SELECT id, member_id, title, description, target_value, unit, target_date,
                    status, created_at, updated_at
             FROM member_goals WHERE member_id = $1
             ORDER BY created_at DESC",
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(goals)
    }

    pub async fn update_goal(
        &self,
        goal_id: Uuid,
        member_id: Uuid,
        request: UpdateGoalRequest,
    ) -> Result<Option<MemberGoal>> {
        if let Some(status) = &request.status {
            if !GOAL_STATUSES.contains(&status.as_str()) {
                anyhow::bail!("invalid goal status: {}", status);
            }
        }

        let goal = sqlx::query_as::<_, MemberGoal>(
            "UPDATE member_goals
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 target_value = COALESCE($5, target_value),
                 unit = COALESCE($6, unit),
                 target_date = COALESCE($7, target_date),
                 status = COALESCE($8, status),
                 updated_at = $9
             WHERE id = $1 AND member_id = $2
             RETURNING id, member_id, title, description, target_value, unit, target_date,
                       status, created_at, updated_at",
        )
        .bind(goal_id)
        .bind(member_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.target_value)
        .bind(request.unit)
        .bind(request.target_date)
        .bind(request.status)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(goal)
    }

    pub async fn delete_goal(&self, goal_id: Uuid, member_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM member_goals WHERE id = $1 AND member_id = $2")
            .bind(goal_id)
            .bind(member_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
