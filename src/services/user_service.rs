use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::UserRole;
use crate::models::{ListUsersQuery, UserSummary};
use crate::services::SystemLogService;

#[derive(Debug, Clone)]
pub struct UserService {
    db: PgPool,
    audit: SystemLogService,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self {
            audit: SystemLogService::new(db.clone()),
            db,
        }
    }

    pub async fn list_users(&self, query: ListUsersQuery) -> Result<Vec<UserSummary>> {
        let limit = query.limit.unwrap_or(50).min(200);
        let offset = query.offset.unwrap_or(0);

        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, email, role, is_active, created_at, updated_at
             FROM users
             WHERE ($1::text IS NULL OR role = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(query.role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    pub async fn update_role(
        &self,
        user_id: Uuid,
        role: UserRole,
        acting_admin: Uuid,
    ) -> Result<Option<UserSummary>> {
        let user = sqlx::query_as::<_, UserSummary>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1
             RETURNING id, email, role, is_active, created_at, updated_at",
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(&self.db)
        .await?;

        if user.is_some() {
            self.audit
                .record(
                    "info",
                    "admin.role_changed",
                    &format!("user {} role set to {}", user_id, role.as_str()),
                    Some(acting_admin),
                )
                .await;
        }

        Ok(user)
    }

    /// Delete a user and everything they own in one transaction. A failure
    /// at any step rolls the whole deletion back.
    pub async fn delete_user(&self, user_id: Uuid, acting_admin: Uuid) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        // Item tables hang off their parent logs/plans via ON DELETE CASCADE;
        // the parent rows and everything keyed directly by user are removed
        // explicitly.
        for sql in [
            "DELETE FROM meal_logs WHERE member_id = $1",
            "DELETE FROM workout_logs WHERE member_id = $1",
            "DELETE FROM weight_logs WHERE member_id = $1",
            "DELETE FROM diet_plans WHERE member_id = $1 OR created_by = $1",
            "DELETE FROM workout_plans WHERE member_id = $1 OR created_by = $1",
            "DELETE FROM member_goals WHERE member_id = $1",
            "DELETE FROM member_check_ins WHERE member_id = $1 OR coach_id = $1",
            "DELETE FROM member_plan_messages WHERE member_id = $1 OR sender_id = $1",
            "DELETE FROM schedules WHERE member_id = $1 OR coach_id = $1",
            "DELETE FROM trainer_assignments WHERE member_id = $1 OR trainer_id = $1",
            "DELETE FROM nutritionist_assignments WHERE member_id = $1 OR nutritionist_id = $1",
            "DELETE FROM notifications WHERE user_id = $1",
            "DELETE FROM member_profiles WHERE member_id = $1",
            "DELETE FROM account_otps WHERE user_id = $1",
            "DELETE FROM refresh_tokens WHERE user_id = $1",
        ] {
            sqlx::query(sql).bind(user_id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.audit
                .record(
                    "warn",
                    "admin.user_deleted",
                    &format!("user {} deleted", user_id),
                    Some(acting_admin),
                )
                .await;
        }

        Ok(deleted)
    }
}
