use crate::dto::admin_dto::{CreateCoreSkillPayload, UpdateCoreSkillPayload};
use crate::dto::student_dto::AssessmentView;
use crate::error::{Error, Result};
use crate::models::skill::{CoreSkill, SkillAssessment, MAX_SUB_SKILLS};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const SKILL_COLUMNS: &str = "id, name, sub_skills, created_at, updated_at";
const ASSESSMENT_COLUMNS: &str =
    "id, student_id, core_skill_id, sub_skill_marks, total_marks, created_at, updated_at";

#[derive(Clone)]
pub struct SkillService {
    pool: PgPool,
}

fn check_sub_skills(sub_skills: &[String]) -> Result<()> {
    if sub_skills.is_empty() {
        return Err(Error::BadRequest("At least one sub-skill is required".into()));
    }
    if sub_skills.len() > MAX_SUB_SKILLS {
        return Err(Error::BadRequest(format!(
            "A core skill can have at most {} sub-skills",
            MAX_SUB_SKILLS
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for name in sub_skills {
        if name.trim().is_empty() {
            return Err(Error::BadRequest("Sub-skill names cannot be empty".into()));
        }
        if !seen.insert(name.trim().to_lowercase()) {
            return Err(Error::BadRequest(format!("Duplicate sub-skill: {}", name)));
        }
    }
    Ok(())
}

impl SkillService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCoreSkillPayload) -> Result<CoreSkill> {
        check_sub_skills(&payload.sub_skills)?;
        let skill = sqlx::query_as::<_, CoreSkill>(&format!(
            "INSERT INTO core_skills (name, sub_skills) VALUES ($1, $2) RETURNING {}",
            SKILL_COLUMNS
        ))
        .bind(payload.name)
        .bind(Json(payload.sub_skills))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("A core skill with this name already exists".into()),
            other => other,
        })?;
        Ok(skill)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCoreSkillPayload) -> Result<CoreSkill> {
        if let Some(ref sub_skills) = payload.sub_skills {
            check_sub_skills(sub_skills)?;
        }
        let skill = sqlx::query_as::<_, CoreSkill>(&format!(
            "UPDATE core_skills
             SET name = COALESCE($2, name),
                 sub_skills = COALESCE($3, sub_skills),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            SKILL_COLUMNS
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.sub_skills.map(Json))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Core skill not found".into()))?;
        Ok(skill)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<CoreSkill>> {
        let skill = sqlx::query_as::<_, CoreSkill>(&format!(
            "SELECT {} FROM core_skills WHERE id = $1",
            SKILL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(skill)
    }

    pub async fn list(&self) -> Result<Vec<CoreSkill>> {
        let skills = sqlx::query_as::<_, CoreSkill>(&format!(
            "SELECT {} FROM core_skills ORDER BY name",
            SKILL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM core_skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Core skill not found".into()));
        }
        Ok(())
    }

    /// Creates or overwrites the (student, skill) assessment in one
    /// statement; the uniqueness constraint makes the upsert atomic.
    pub async fn upsert_assessment(
        &self,
        student_id: Uuid,
        core_skill_id: Uuid,
        marks: HashMap<String, i32>,
    ) -> Result<SkillAssessment> {
        let total: i32 = marks.values().sum();
        let assessment = sqlx::query_as::<_, SkillAssessment>(&format!(
            "INSERT INTO skill_assessments (student_id, core_skill_id, sub_skill_marks, total_marks)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (student_id, core_skill_id) DO UPDATE
             SET sub_skill_marks = EXCLUDED.sub_skill_marks,
                 total_marks = EXCLUDED.total_marks,
                 updated_at = NOW()
             RETURNING {}",
            ASSESSMENT_COLUMNS
        ))
        .bind(student_id)
        .bind(core_skill_id)
        .bind(Json(marks))
        .bind(total)
        .fetch_one(&self.pool)
        .await?;
        Ok(assessment)
    }

    pub async fn assessments_for_student(&self, student_id: Uuid) -> Result<Vec<AssessmentView>> {
        let rows = sqlx::query_as::<_, AssessmentView>(
            "SELECT sa.core_skill_id, cs.name AS core_skill_name,
                    sa.sub_skill_marks, sa.total_marks
             FROM skill_assessments sa
             JOIN core_skills cs ON cs.id = sa.core_skill_id
             WHERE sa.student_id = $1
             ORDER BY cs.name",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_skill_list_is_capped_at_four() {
        let four: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert!(check_sub_skills(&four).is_ok());

        let five: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(check_sub_skills(&five).is_err());
    }

    #[test]
    fn empty_and_duplicate_sub_skills_are_rejected() {
        assert!(check_sub_skills(&[]).is_err());
        assert!(check_sub_skills(&["".into()]).is_err());
        assert!(check_sub_skills(&["Algebra".into(), "algebra".into()]).is_err());
    }
}
