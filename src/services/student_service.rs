use crate::dto::student_dto::{
    CertificationInput, EducationInput, UpdateStudentProfilePayload,
};
use crate::error::{Error, Result};
use crate::models::student::{Certification, Education, Student};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;
use uuid::Uuid;

const STUDENT_COLUMNS: &str = "id, user_id, first_name, last_name, mobile, bio, image_url, \
     resume_url, skills, created_at, updated_at";
const EDUCATION_COLUMNS: &str = "id, student_id, institution, degree, field_of_study, \
     start_year, end_year, grade, created_at";
const CERTIFICATION_COLUMNS: &str =
    "id, student_id, name, issuer, issued_on, certificate_url, created_at";

/// How a submitted replacement set maps onto existing rows.
#[derive(Debug, PartialEq, Eq)]
pub struct ReconcilePlan<T> {
    pub create: Vec<T>,
    pub update: Vec<(Uuid, T)>,
    pub delete: Vec<Uuid>,
}

/// Splits a submitted set against the existing row ids: entries carrying a
/// known id update that row, entries without an id create a new row, and
/// existing rows absent from the submission are deleted. An id that does
/// not belong to the caller is a hard error, not a silent create.
pub fn plan_reconciliation<T>(
    existing: &[Uuid],
    submitted: Vec<(Option<Uuid>, T)>,
) -> Result<ReconcilePlan<T>> {
    let existing_set: HashSet<Uuid> = existing.iter().copied().collect();
    let mut plan = ReconcilePlan {
        create: Vec::new(),
        update: Vec::new(),
        delete: Vec::new(),
    };
    let mut kept = HashSet::new();

    for (id, item) in submitted {
        match id {
            Some(id) if existing_set.contains(&id) => {
                kept.insert(id);
                plan.update.push((id, item));
            }
            Some(id) => {
                return Err(Error::BadRequest(format!("Unknown entry id {}", id)));
            }
            None => plan.create.push(item),
        }
    }

    plan.delete = existing
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();
    Ok(plan)
}

/// Who to address notifications and emails to for a student.
#[derive(Debug, sqlx::FromRow)]
pub struct StudentContact {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl StudentContact {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Clone)]
pub struct StudentService {
    pool: PgPool,
}

impl StudentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE user_id = $1",
            STUDENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT s.{} FROM students s JOIN users u ON u.id = s.user_id WHERE u.email = $1",
            STUDENT_COLUMNS.replace(", ", ", s.")
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn contact(&self, student_id: Uuid) -> Result<Option<StudentContact>> {
        let contact = sqlx::query_as::<_, StudentContact>(
            "SELECT u.id AS user_id, u.email, s.first_name, s.last_name
             FROM students s JOIN users u ON u.id = s.user_id
             WHERE s.id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }

    pub async fn fill_onboarding_profile(
        &self,
        user_id: Uuid,
        first_name: &str,
        last_name: &str,
        mobile: Option<&str>,
        bio: Option<&str>,
        skills: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET first_name = $2, last_name = $3, mobile = $4, bio = $5, skills = $6,
                 image_url = COALESCE($7, image_url), updated_at = NOW()
             WHERE user_id = $1
             RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(mobile)
        .bind(bio)
        .bind(skills)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Student profile not found".into()))?;
        Ok(student)
    }

    pub async fn list_educations(&self, student_id: Uuid) -> Result<Vec<Education>> {
        let rows = sqlx::query_as::<_, Education>(&format!(
            "SELECT {} FROM educations WHERE student_id = $1 ORDER BY start_year NULLS LAST, created_at",
            EDUCATION_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_certifications(&self, student_id: Uuid) -> Result<Vec<Certification>> {
        let rows = sqlx::query_as::<_, Certification>(&format!(
            "SELECT {} FROM certifications WHERE student_id = $1 ORDER BY created_at",
            CERTIFICATION_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Applies a profile patch. Education/certification arrays are full
    /// replacement sets; a follow-up fetch returns exactly what was
    /// submitted.
    pub async fn update_profile(
        &self,
        student: &Student,
        payload: UpdateStudentProfilePayload,
    ) -> Result<Student> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 mobile = COALESCE($4, mobile),
                 bio = COALESCE($5, bio),
                 image_url = COALESCE($6, image_url),
                 resume_url = COALESCE($7, resume_url),
                 skills = COALESCE($8, skills),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(student.id)
        .bind(payload.first_name)
        .bind(payload.last_name)
        .bind(payload.mobile)
        .bind(payload.bio)
        .bind(payload.image_url)
        .bind(payload.resume_url)
        .bind(payload.skills)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(educations) = payload.educations {
            self.reconcile_educations(&mut tx, student.id, educations)
                .await?;
        }
        if let Some(certifications) = payload.certifications {
            self.reconcile_certifications(&mut tx, student.id, certifications)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn reconcile_educations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        student_id: Uuid,
        submitted: Vec<EducationInput>,
    ) -> Result<()> {
        let existing: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM educations WHERE student_id = $1")
                .bind(student_id)
                .fetch_all(&mut **tx)
                .await?;

        let plan = plan_reconciliation(
            &existing,
            submitted.into_iter().map(|e| (e.id, e)).collect(),
        )?;

        for id in &plan.delete {
            sqlx::query("DELETE FROM educations WHERE id = $1 AND student_id = $2")
                .bind(id)
                .bind(student_id)
                .execute(&mut **tx)
                .await?;
        }
        for (id, entry) in plan.update {
            sqlx::query(
                "UPDATE educations
                 SET institution = $3, degree = $4, field_of_study = $5,
                     start_year = $6, end_year = $7, grade = $8
                 WHERE id = $1 AND student_id = $2",
            )
            .bind(id)
            .bind(student_id)
            .bind(entry.institution)
            .bind(entry.degree)
            .bind(entry.field_of_study)
            .bind(entry.start_year)
            .bind(entry.end_year)
            .bind(entry.grade)
            .execute(&mut **tx)
            .await?;
        }
        for entry in plan.create {
            sqlx::query(
                "INSERT INTO educations
                     (student_id, institution, degree, field_of_study, start_year, end_year, grade)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(student_id)
            .bind(entry.institution)
            .bind(entry.degree)
            .bind(entry.field_of_study)
            .bind(entry.start_year)
            .bind(entry.end_year)
            .bind(entry.grade)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn reconcile_certifications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        student_id: Uuid,
        submitted: Vec<CertificationInput>,
    ) -> Result<()> {
        let existing: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM certifications WHERE student_id = $1")
                .bind(student_id)
                .fetch_all(&mut **tx)
                .await?;

        let plan = plan_reconciliation(
            &existing,
            submitted.into_iter().map(|c| (c.id, c)).collect(),
        )?;

        for id in &plan.delete {
            sqlx::query("DELETE FROM certifications WHERE id = $1 AND student_id = $2")
                .bind(id)
                .bind(student_id)
                .execute(&mut **tx)
                .await?;
        }
        for (id, entry) in plan.update {
            let issued_on = parse_optional_date(entry.issued_on.as_deref())?;
            sqlx::query(
                "UPDATE certifications
                 SET name = $3, issuer = $4, issued_on = $5, certificate_url = $6
                 WHERE id = $1 AND student_id = $2",
            )
            .bind(id)
            .bind(student_id)
            .bind(entry.name)
            .bind(entry.issuer)
            .bind(issued_on)
            .bind(entry.certificate_url)
            .execute(&mut **tx)
            .await?;
        }
        for entry in plan.create {
            let issued_on = parse_optional_date(entry.issued_on.as_deref())?;
            sqlx::query(
                "INSERT INTO certifications (student_id, name, issuer, issued_on, certificate_url)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(student_id)
            .bind(entry.name)
            .bind(entry.issuer)
            .bind(issued_on)
            .bind(entry.certificate_url)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

fn parse_optional_date(input: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    match input {
        None => Ok(None),
        Some(raw) => crate::utils::time::parse_date(raw)
            .map(Some)
            .map_err(|e| Error::BadRequest(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn submitted_set_splits_into_create_update_delete() {
        let existing = ids(3);
        let submitted = vec![
            (Some(existing[0]), "keep-and-update"),
            (None, "brand-new"),
        ];
        let plan = plan_reconciliation(&existing, submitted).expect("plan");
        assert_eq!(plan.create, vec!["brand-new"]);
        assert_eq!(plan.update, vec![(existing[0], "keep-and-update")]);
        assert_eq!(plan.delete, vec![existing[1], existing[2]]);
    }

    #[test]
    fn empty_submission_deletes_everything() {
        let existing = ids(2);
        let plan = plan_reconciliation::<&str>(&existing, vec![]).expect("plan");
        assert!(plan.create.is_empty());
        assert!(plan.update.is_empty());
        assert_eq!(plan.delete, existing);
    }

    #[test]
    fn foreign_id_is_rejected() {
        let existing = ids(1);
        let submitted = vec![(Some(Uuid::new_v4()), "not-yours")];
        assert!(plan_reconciliation(&existing, submitted).is_err());
    }

    #[test]
    fn full_round_trip_preserves_the_submitted_set() {
        let existing = ids(2);
        let submitted = vec![
            (Some(existing[0]), "a"),
            (Some(existing[1]), "b"),
            (None, "c"),
        ];
        let plan = plan_reconciliation(&existing, submitted).expect("plan");
        assert_eq!(plan.update.len() + plan.create.len(), 3);
        assert!(plan.delete.is_empty());
    }
}
