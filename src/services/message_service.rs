use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Discipline;
use crate::models::PlanMessage;
use crate::services::NotificationService;

#[derive(Debug, Clone)]
pub struct MessageService {
    db: PgPool,
    notifications: NotificationService,
}

impl MessageService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Post a message into a member's thread for a discipline. The counter-
    /// party (assigned coach if the member posts, the member otherwise) gets
    /// a notification.
    pub async fn post_message(
        &self,
        member_id: Uuid,
        sender_id: Uuid,
        discipline: Discipline,
        body: &str,
    ) -> Result<PlanMessage> {
        let message = sqlx::query_as::<_, PlanMessage>(
            "INSERT INTO member_plan_messages (id, member_id, sender_id, discipline, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, member_id, sender_id, discipline, body, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(sender_id)
        .bind(discipline.as_str())
        .bind(body)
        .fetch_one(&self.db)
        .await?;

        let recipient = if sender_id == member_id {
            self.assigned_coach(member_id, discipline).await?
        } else {
            Some(member_id)
        };

        if let Some(recipient) = recipient {
            if let Err(err) = self
                .notifications
                .notify(recipient, "New plan message", body)
                .await
            {
                tracing::warn!("failed to notify {} of new message: {}", recipient, err);
            }
        }

        Ok(message)
    }

    /// List a member's messages limited to the given disciplines. Callers
    /// pass only the disciplines the requester is authorized for.
    pub async fn list_messages(
        &self,
        member_id: Uuid,
        disciplines: &[Discipline],
    ) -> Result<Vec<PlanMessage>> {
        let names: Vec<String> = disciplines.iter().map(|d| d.as_str().to_string()).collect();

        let messages = sqlx::query_as::<_, PlanMessage>(
            "SELECT id, member_id, sender_id, discipline, body, created_at
             FROM member_plan_messages
             WHERE member_id = $1 AND discipline = ANY($2)
             ORDER BY created_at ASC",
        )
        .bind(member_id)
        .bind(&names)
        .fetch_all(&self.db)
        .await?;

        Ok(messages)
    }

    async fn assigned_coach(
        &self,
        member_id: Uuid,
        discipline: Discipline,
    ) -> Result<Option<Uuid>> {
        let coach = match discipline {
            Discipline::Diet => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT nutritionist_id FROM nutritionist_assignments WHERE member_id = $1",
                )
                .bind(member_id)
                .fetch_optional(&self.db)
                .await?
            }
            Discipline::Workout | Discipline::General => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT trainer_id FROM trainer_assignments WHERE member_id = $1",
                )
                .bind(member_id)
                .fetch_optional(&self.db)
                .await?
            }
        };

        Ok(coach)
    }
}
