use crate::dto::school_dto::{CreateJobPayload, UpdateJobPayload};
use crate::dto::student_dto::{JobBrowseQuery, JobListing};
use crate::error::{Error, Result};
use crate::models::job::{Job, JOB_CLOSED, JOB_OPEN};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

const JOB_COLUMNS: &str = "id, school_id, category_id, title, location, application_end_date, \
     salary_min, salary_max, description, responsibilities, requirements, status, \
     created_at, updated_at";

const LISTING_COLUMNS: &str = "j.id, j.title, j.location, j.application_end_date, \
     j.salary_min, j.salary_max, j.status, s.name AS school_name, c.name AS category_name, \
     j.created_at";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        school_id: Uuid,
        payload: CreateJobPayload,
        end_date: NaiveDate,
    ) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs (school_id, category_id, title, location, application_end_date,
                               salary_min, salary_max, description, responsibilities, requirements)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            JOB_COLUMNS
        ))
        .bind(school_id)
        .bind(payload.category_id)
        .bind(payload.title)
        .bind(payload.location)
        .bind(end_date)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.description)
        .bind(payload.responsibilities)
        .bind(payload.requirements)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    /// Fetches a job only if the given school owns it. Foreign jobs come
    /// back as not-found, never forbidden.
    pub async fn get_owned(&self, school_id: Uuid, job_id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = $1 AND school_id = $2",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn get_by_id(&self, job_id: Uuid) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn list_for_school(&self, school_id: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE school_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn update(
        &self,
        school_id: Uuid,
        job_id: Uuid,
        payload: UpdateJobPayload,
        end_date: Option<NaiveDate>,
    ) -> Result<Job> {
        self.get_owned(school_id, job_id).await?;

        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs
             SET title = COALESCE($3, title),
                 location = COALESCE($4, location),
                 application_end_date = COALESCE($5, application_end_date),
                 category_id = COALESCE($6, category_id),
                 salary_min = COALESCE($7, salary_min),
                 salary_max = COALESCE($8, salary_max),
                 description = COALESCE($9, description),
                 responsibilities = COALESCE($10, responsibilities),
                 requirements = COALESCE($11, requirements),
                 updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {}",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(school_id)
        .bind(payload.title)
        .bind(payload.location)
        .bind(end_date)
        .bind(payload.category_id)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.description)
        .bind(payload.responsibilities)
        .bind(payload.requirements)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn set_status(&self, school_id: Uuid, job_id: Uuid, status: &str) -> Result<Job> {
        if status != JOB_OPEN && status != JOB_CLOSED {
            return Err(Error::BadRequest(format!("Unknown job status: {}", status)));
        }
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET status = $3, updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {}",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(school_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
        Ok(job)
    }

    pub async fn delete(&self, school_id: Uuid, job_id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1 AND school_id = $2")
            .bind(job_id)
            .bind(school_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Job not found".into()));
        }
        Ok(())
    }

    /// Open jobs still accepting applications, for the student browse page.
    pub async fn browse_open(&self, query: JobBrowseQuery) -> Result<Vec<JobListing>> {
        let mut filters = vec![
            "j.status = 'open'".to_string(),
            "j.application_end_date >= CURRENT_DATE".to_string(),
        ];
        let mut text_args: Vec<String> = Vec::new();
        let mut category: Option<Uuid> = None;

        if let Some(cat) = query.category {
            filters.push(format!("j.category_id = ${}", text_args.len() + 1));
            category = Some(cat);
        }
        let category_taken = category.is_some() as usize;
        if let Some(location) = query.location {
            filters.push(format!(
                "j.location ILIKE ${}",
                text_args.len() + 1 + category_taken
            ));
            text_args.push(format!("%{}%", location));
        }
        if let Some(search) = query.search {
            let first = text_args.len() + 1 + category_taken;
            let second = first + 1;
            filters.push(format!(
                "(j.title ILIKE ${} OR j.description ILIKE ${})",
                first, second
            ));
            text_args.push(format!("%{}%", search.clone()));
            text_args.push(format!("%{}%", search));
        }

        let sql = format!(
            "SELECT {} FROM jobs j
             JOIN schools s ON s.id = j.school_id
             LEFT JOIN categories c ON c.id = j.category_id
             WHERE {}
             ORDER BY j.created_at DESC",
            LISTING_COLUMNS,
            filters.join(" AND ")
        );

        let mut statement = sqlx::query_as::<_, JobListing>(&sql);
        if let Some(cat) = category {
            statement = statement.bind(cat);
        }
        for value in &text_args {
            statement = statement.bind(value);
        }
        let jobs = statement.fetch_all(&self.pool).await?;
        Ok(jobs)
    }

    pub async fn recent_open(&self, limit: i64) -> Result<Vec<JobListing>> {
        let sql = format!(
            "SELECT {} FROM jobs j
             JOIN schools s ON s.id = j.school_id
             LEFT JOIN categories c ON c.id = j.category_id
             WHERE j.status = 'open' AND j.application_end_date >= CURRENT_DATE
             ORDER BY j.created_at DESC
             LIMIT $1",
            LISTING_COLUMNS
        );
        let jobs = sqlx::query_as::<_, JobListing>(&sql)
            .bind(limit.clamp(1, 50))
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    pub async fn counts_by_status(&self) -> Result<std::collections::HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM jobs GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
