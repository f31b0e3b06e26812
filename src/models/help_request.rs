use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const HELP_OPEN: &str = "open";
pub const HELP_RESOLVED: &str = "resolved";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HelpRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
