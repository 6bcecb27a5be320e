use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{Discipline, UserRole};
use crate::error::ApiError;
use crate::models::{Assignment, AssignedMember};
use crate::services::{NotificationService, SystemLogService};

#[derive(Debug, Clone)]
pub struct AssignmentService {
    db: PgPool,
    notifications: NotificationService,
    audit: SystemLogService,
}

impl AssignmentService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self {
            audit: SystemLogService::new(db.clone()),
            db,
            notifications,
        }
    }

    /// Upsert a coach assignment. One trainer and one nutritionist per member;
    /// a conflicting row is replaced. Both parties are notified and the change
    /// lands in the audit trail. Bad input comes back as a typed validation
    /// error so database failures stay internal.
    pub async fn upsert_assignment(
        &self,
        member_id: Uuid,
        coach_id: Uuid,
        discipline: Discipline,
        acting_admin: Uuid,
    ) -> Result<Assignment, ApiError> {
        let (table, coach_column, expected_role) = match discipline {
            Discipline::Diet => ("nutritionist_assignments", "nutritionist_id", UserRole::Nutritionist),
            Discipline::Workout => ("trainer_assignments", "trainer_id", UserRole::Trainer),
            Discipline::General => {
                return Err(ApiError::Validation(
                    "assignments are per discipline, not general".to_string(),
                ))
            }
        };

        let coach_role: Option<String> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1 AND is_active")
                .bind(coach_id)
                .fetch_optional(&self.db)
                .await?;

        match coach_role.as_deref().and_then(UserRole::from_str) {
            Some(role) if role == expected_role => {}
            _ => {
                return Err(ApiError::Validation(format!(
                    "coach {} is not an active {}",
                    coach_id,
                    expected_role.as_str()
                )))
            }
        }

        let member_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND role = 'member')",
        )
        .bind(member_id)
        .fetch_one(&self.db)
        .await?;

        if !member_exists {
            return Err(ApiError::Validation(format!("member {} not found", member_id)));
        }

        let sql = format!(
            "INSERT INTO {table} (member_id, {coach_column}, assigned_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (member_id) DO UPDATE SET {coach_column} = $2, assigned_at = NOW()
             RETURNING member_id, {coach_column} AS coach_id, assigned_at"
        );

        let assignment = sqlx::query_as::<_, Assignment>(&sql)
            .bind(member_id)
            .bind(coach_id)
            .fetch_one(&self.db)
            .await?;

        self.audit
            .record(
                "info",
                "admin.assignment_changed",
                &format!(
                    "{} {} assigned to member {}",
                    expected_role.as_str(),
                    coach_id,
                    member_id
                ),
                Some(acting_admin),
            )
            .await;

        let discipline_name = match discipline {
            Discipline::Diet => "nutritionist",
            _ => "trainer",
        };
        if let Err(err) = self
            .notifications
            .notify(
                member_id,
                &format!("New {} assigned", discipline_name),
                &format!("A {} has been assigned to your account.", discipline_name),
            )
            .await
        {
            tracing::warn!("failed to notify member {} of assignment: {}", member_id, err);
        }
        if let Err(err) = self
            .notifications
            .notify(
                coach_id,
                "New member assigned",
                "A member has been assigned to you.",
            )
            .await
        {
            tracing::warn!("failed to notify coach {} of assignment: {}", coach_id, err);
        }

        Ok(assignment)
    }

    /// Members assigned to a coach, for the coach dashboard.
    pub async fn list_members_for_coach(
        &self,
        coach_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<AssignedMember>> {
        let sql = match role {
            UserRole::Trainer => {
                "SELECT a.member_id, u.email, a.assigned_at
                 FROM trainer_assignments a JOIN users u ON u.id = a.member_id
                 WHERE a.trainer_id = $1 ORDER BY a.assigned_at DESC"
            }
            UserRole::Nutritionist => {
                "SELECT a.member_id, u.email, a.assigned_at
                 FROM nutritionist_assignments a JOIN users u ON u.id = a.member_id
                 WHERE a.nutritionist_id = $1 ORDER BY a.assigned_at DESC"
            }
            _ => anyhow::bail!("not a coach role"),
        };

        let members = sqlx::query_as::<_, AssignedMember>(sql)
            .bind(coach_id)
            .fetch_all(&self.db)
            .await?;

        Ok(members)
    }
}
