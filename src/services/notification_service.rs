use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Notification, NotificationQuery};
use crate::services::EmailService;

#[derive(Debug, Clone)]
pub struct NotificationService {
    db: PgPool,
    email: EmailService,
}

impl NotificationService {
    pub fn new(db: PgPool, email: EmailService) -> Self {
        Self { db, email }
    }

    /// Create an in-app notification and attempt email delivery. Email
    /// failures are logged, never surfaced to the triggering request.
    pub async fn notify(&self, user_id: Uuid, title: &str, body: &str) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, title, body)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, title, body, is_read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(body)
        .fetch_one(&self.db)
        .await?;

        let email: Option<String> =
            sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        if let Some(email) = email {
            if let Err(err) = self.email.send_notification(&email, title, body).await {
                tracing::warn!("failed to email notification to {}: {}", email, err);
            }
        }

        Ok(notification)
    }

    pub async fn list(&self, user_id: Uuid, query: NotificationQuery) -> Result<Vec<Notification>> {
        let limit = query.limit.unwrap_or(50).min(200);
        let offset = query.offset.unwrap_or(0);
        let unread_only = query.unread_only.unwrap_or(false);

        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, title, body, is_read, created_at
             FROM notifications
             WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    /// Mark one of the user's notifications as read. Returns false when the
    /// notification does not exist or belongs to someone else.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2")
                .bind(notification_id)
                .bind(user_id)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
