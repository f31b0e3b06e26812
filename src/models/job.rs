use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const JOB_OPEN: &str = "open";
pub const JOB_CLOSED: &str = "closed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub school_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub location: String,
    pub application_end_date: NaiveDate,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
