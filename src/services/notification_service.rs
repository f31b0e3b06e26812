use crate::error::{Error, Result};
use crate::models::notification::Notification;
use sqlx::PgPool;
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, kind, link, is_read, created_at";

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        message: &str,
        kind: &str,
        link: Option<&str>,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (user_id, message, kind, link)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(message)
        .bind(kind)
        .bind(link)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    /// Best-effort variant for side-channel writes: failures are logged,
    /// never propagated to the triggering request.
    pub async fn notify_quietly(&self, user_id: Uuid, message: &str, kind: &str, link: Option<&str>) {
        if let Err(e) = self.create(user_id, message, kind, link).await {
            tracing::error!(error = ?e, "failed to write notification");
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    /// Marks one of the caller's notifications read. Re-marking an already
    /// read notification succeeds without effect.
    pub async fn mark_as_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Notification not found".into()))?;
        Ok(notification)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
