use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::category::Category;
use crate::models::skill::CoreSkill;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCoreSkillPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "needs at least one entry"))]
    pub sub_skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCoreSkillPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: Option<String>,
    pub sub_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[serde(default)]
    pub core_skill_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: Option<String>,
    pub core_skill_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubskillLimitPayload {
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailTemplatePayload {
    #[validate(length(min = 1, message = "is required"))]
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub core_skill_ids: Vec<Uuid>,
}

impl CategoryResponse {
    pub fn from_parts(category: Category, core_skill_ids: Vec<Uuid>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            core_skill_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoreSkillResponse {
    pub id: Uuid,
    pub name: String,
    pub sub_skills: Vec<String>,
}

impl From<CoreSkill> for CoreSkillResponse {
    fn from(value: CoreSkill) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sub_skills: value.sub_skills.0,
        }
    }
}
