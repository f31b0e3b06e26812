use crate::error::Result;
use crate::models::setting::{Setting, DEFAULT_SUBSKILL_MARK_LIMIT, SUBSKILL_MARK_LIMIT_KEY};
use sqlx::PgPool;

#[derive(Clone)]
pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(setting)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<Setting> {
        let setting = sqlx::query_as::<_, Setting>(
            "INSERT INTO settings (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
             RETURNING key, value, updated_at",
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(setting)
    }

    /// Ceiling for individual sub-skill marks; falls back to the default
    /// when unset or unparseable.
    pub async fn subskill_mark_limit(&self) -> Result<i32> {
        let limit = self
            .get(SUBSKILL_MARK_LIMIT_KEY)
            .await?
            .and_then(|s| s.value.parse().ok())
            .unwrap_or(DEFAULT_SUBSKILL_MARK_LIMIT);
        Ok(limit)
    }

    pub async fn email_template(&self, key: &str) -> Result<Option<String>> {
        let full_key = format!("email_template.{}", key);
        Ok(self.get(&full_key).await?.map(|s| s.value))
    }
}
