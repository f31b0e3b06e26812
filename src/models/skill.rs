use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// Hard cap on sub-skills per core skill, enforced at admin create/update.
pub const MAX_SUB_SKILLS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoreSkill {
    pub id: Uuid,
    pub name: String,
    pub sub_skills: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillAssessment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub core_skill_id: Uuid,
    pub sub_skill_marks: Json<HashMap<String, i32>>,
    pub total_marks: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
