use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationStatus, Interview};
use crate::models::job::Job;
use crate::utils::validation::{validate_pincode, validate_time};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSchoolProfilePayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: Option<String>,
    pub bio: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom(function = validate_pincode))]
    pub pincode: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub location: String,
    /// Accepted in any of the supported date formats; canonicalized on write.
    #[validate(length(min = 1, message = "is required"))]
    pub application_end_date: String,
    pub category_id: Option<Uuid>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub location: Option<String>,
    pub application_end_date: Option<String>,
    pub category_id: Option<Uuid>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleInterviewPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub date: String,
    #[validate(custom(function = validate_time))]
    pub start_time: String,
    #[validate(custom(function = validate_time))]
    pub end_time: String,
    #[validate(length(min = 1, message = "is required"))]
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
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
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            school_id: value.school_id,
            category_id: value.category_id,
            title: value.title,
            location: value.location,
            application_end_date: value.application_end_date,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            description: value.description,
            responsibilities: value.responsibilities,
            requirements: value.requirements,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// One row in the applicants listing for a job.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantSummary {
    pub application_id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub status: String,
    pub display_status: String,
    pub resume_url: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub display_status: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<Interview>,
}

impl ApplicationResponse {
    pub fn from_parts(application: Application, interview: Option<Interview>) -> Self {
        let display_status = ApplicationStatus::parse(&application.status)
            .map(|s| s.display_bucket().to_string())
            .unwrap_or_else(|| application.status.clone());
        Self {
            id: application.id,
            student_id: application.student_id,
            job_id: application.job_id,
            status: application.status,
            display_status,
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            applied_at: application.applied_at,
            interview,
        }
    }
}
