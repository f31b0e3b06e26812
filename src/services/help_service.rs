use crate::error::{Error, Result};
use crate::models::help_request::{HelpRequest, HELP_OPEN, HELP_RESOLVED};
use sqlx::PgPool;
use uuid::Uuid;

const HELP_COLUMNS: &str = "id, user_id, subject, message, status, created_at, updated_at";

#[derive(Clone)]
pub struct HelpService {
    pool: PgPool,
}

impl HelpService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, subject: &str, message: &str) -> Result<HelpRequest> {
        let request = sqlx::query_as::<_, HelpRequest>(&format!(
            "INSERT INTO help_requests (user_id, subject, message, status)
             VALUES ($1, $2, $3, '{}')
             RETURNING {}",
            HELP_OPEN, HELP_COLUMNS
        ))
        .bind(user_id)
        .bind(subject)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<HelpRequest>> {
        let requests = sqlx::query_as::<_, HelpRequest>(&format!(
            "SELECT {} FROM help_requests WHERE user_id = $1 ORDER BY created_at DESC",
            HELP_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_all(&self) -> Result<Vec<HelpRequest>> {
        let requests = sqlx::query_as::<_, HelpRequest>(&format!(
            "SELECT {} FROM help_requests ORDER BY created_at DESC",
            HELP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn open_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM help_requests WHERE status = 'open'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn resolve(&self, id: Uuid) -> Result<HelpRequest> {
        let request = sqlx::query_as::<_, HelpRequest>(&format!(
            "UPDATE help_requests SET status = '{}', updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            HELP_RESOLVED, HELP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Help request not found".into()))?;
        Ok(request)
    }
}
