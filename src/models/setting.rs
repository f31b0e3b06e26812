use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const SUBSKILL_MARK_LIMIT_KEY: &str = "subskill_mark_limit";
pub const DEFAULT_SUBSKILL_MARK_LIMIT: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
