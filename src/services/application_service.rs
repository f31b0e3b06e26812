use crate::dto::school_dto::ApplicantSummary;
use crate::dto::student_dto::UpcomingInterview;
use crate::error::{Error, Result};
use crate::models::application::{self, Application, ApplicationStatus, Interview};
use crate::models::job::{Job, JOB_OPEN};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const APPLICATION_COLUMNS: &str =
    "id, student_id, job_id, status, cover_letter, resume_url, applied_at, updated_at";
const INTERVIEW_COLUMNS: &str = "id, application_id, title, scheduled_on, start_time, end_time, \
     location, created_at, updated_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ApplicantRow {
    application_id: Uuid,
    student_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    status: String,
    resume_url: Option<String>,
    applied_at: DateTime<Utc>,
}

/// Application row joined with its job and any interview, for the
/// student's own listing.
#[derive(Debug, FromRow, serde::Serialize)]
pub struct StudentApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub school_name: String,
    pub status: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub interview_title: Option<String>,
    pub interview_scheduled_on: Option<NaiveDate>,
    pub interview_start_time: Option<String>,
    pub interview_end_time: Option<String>,
    pub interview_location: Option<String>,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submits an application. The duplicate-application constraint
    /// surfaces as a conflict; a closed or expired job is rejected before
    /// any write.
    pub async fn apply(
        &self,
        student_id: Uuid,
        job: &Job,
        cover_letter: Option<String>,
        resume_url: Option<String>,
    ) -> Result<Application> {
        if job.status != JOB_OPEN {
            return Err(Error::BadRequest("This job is no longer open".into()));
        }
        if job.application_end_date < Utc::now().date_naive() {
            return Err(Error::BadRequest(
                "The application window for this job has closed".into(),
            ));
        }

        let application = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (student_id, job_id, cover_letter, resume_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(student_id)
        .bind(job.id)
        .bind(cover_letter)
        .bind(resume_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("You have already applied to this job".into()),
            other => other,
        })?;
        Ok(application)
    }

    /// Fetches an application only when the given school owns the
    /// underlying job; anything else is a not-found.
    pub async fn get_for_school(
        &self,
        school_id: Uuid,
        application_id: Uuid,
    ) -> Result<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT a.{} FROM applications a
             JOIN jobs j ON j.id = a.job_id
             WHERE a.id = $1 AND j.school_id = $2",
            APPLICATION_COLUMNS.replace(", ", ", a.")
        ))
        .bind(application_id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    /// Runs the target status through the transition table and persists it.
    /// Returns the updated row and whether the status actually changed.
    pub async fn update_status(
        &self,
        application: &Application,
        target: ApplicationStatus,
    ) -> Result<(Application, bool)> {
        let current = ApplicationStatus::parse(&application.status).ok_or_else(|| {
            Error::Internal(format!("Corrupt application status: {}", application.status))
        })?;
        let next = application::transition(current, target)?;
        let changed = next != current;

        let updated = sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(application.id)
        .bind(next.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok((updated, changed))
    }

    /// Creates the interview or replaces the existing one (idempotent
    /// reschedule) and moves the application to interview_scheduled. The
    /// transition table enforces that the application was shortlisted
    /// first.
    pub async fn schedule_interview(
        &self,
        application: &Application,
        title: &str,
        scheduled_on: NaiveDate,
        start_time: &str,
        end_time: &str,
        location: &str,
    ) -> Result<(Application, Interview)> {
        let (updated, _) = self
            .update_status(application, ApplicationStatus::InterviewScheduled)
            .await?;

        let interview = sqlx::query_as::<_, Interview>(&format!(
            "INSERT INTO interviews (application_id, title, scheduled_on, start_time, end_time, location)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (application_id) DO UPDATE
             SET title = EXCLUDED.title,
                 scheduled_on = EXCLUDED.scheduled_on,
                 start_time = EXCLUDED.start_time,
                 end_time = EXCLUDED.end_time,
                 location = EXCLUDED.location,
                 updated_at = NOW()
             RETURNING {}",
            INTERVIEW_COLUMNS
        ))
        .bind(application.id)
        .bind(title)
        .bind(scheduled_on)
        .bind(start_time)
        .bind(end_time)
        .bind(location)
        .fetch_one(&self.pool)
        .await?;

        Ok((updated, interview))
    }

    pub async fn get_interview(&self, application_id: Uuid) -> Result<Option<Interview>> {
        let interview = sqlx::query_as::<_, Interview>(&format!(
            "SELECT {} FROM interviews WHERE application_id = $1",
            INTERVIEW_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(interview)
    }

    pub async fn applicants_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicantSummary>> {
        let rows = sqlx::query_as::<_, ApplicantRow>(
            "SELECT a.id AS application_id, a.student_id, st.first_name, st.last_name,
                    u.email, a.status, a.resume_url, a.applied_at
             FROM applications a
             JOIN students st ON st.id = a.student_id
             JOIN users u ON u.id = st.user_id
             WHERE a.job_id = $1
             ORDER BY a.applied_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let display_status = ApplicationStatus::parse(&row.status)
                    .map(|s| s.display_bucket().to_string())
                    .unwrap_or_else(|| row.status.clone());
                ApplicantSummary {
                    application_id: row.application_id,
                    student_id: row.student_id,
                    student_name: format!("{} {}", row.first_name, row.last_name)
                        .trim()
                        .to_string(),
                    student_email: row.email,
                    status: row.status,
                    display_status,
                    resume_url: row.resume_url,
                    applied_at: row.applied_at,
                }
            })
            .collect())
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<StudentApplicationRow>> {
        let rows = sqlx::query_as::<_, StudentApplicationRow>(
            "SELECT a.id, a.job_id, j.title AS job_title, s.name AS school_name,
                    a.status, a.cover_letter, a.resume_url, a.applied_at,
                    i.title AS interview_title, i.scheduled_on AS interview_scheduled_on,
                    i.start_time AS interview_start_time, i.end_time AS interview_end_time,
                    i.location AS interview_location
             FROM applications a
             JOIN jobs j ON j.id = a.job_id
             JOIN schools s ON s.id = j.school_id
             LEFT JOIN interviews i ON i.application_id = a.id
             WHERE a.student_id = $1
             ORDER BY a.applied_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn counts_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<std::collections::HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM applications WHERE student_id = $1 GROUP BY status",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn counts_by_status(&self) -> Result<std::collections::HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM applications GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn upcoming_interviews(&self, student_id: Uuid) -> Result<Vec<UpcomingInterview>> {
        let rows = sqlx::query_as::<_, UpcomingInterview>(
            "SELECT i.id AS interview_id, i.application_id, j.title AS job_title,
                    i.title, i.scheduled_on, i.start_time, i.end_time, i.location
             FROM interviews i
             JOIN applications a ON a.id = i.application_id
             JOIN jobs j ON j.id = a.job_id
             WHERE a.student_id = $1 AND i.scheduled_on >= CURRENT_DATE
             ORDER BY i.scheduled_on ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
