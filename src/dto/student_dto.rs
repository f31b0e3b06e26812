use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::student::{Certification, Education, Student};
use crate::utils::validation::validate_mobile;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudentProfilePayload {
    #[validate(length(min = 1, message = "is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub last_name: Option<String>,
    #[validate(custom(function = validate_mobile))]
    pub mobile: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Option<String>,
    /// Full replacement sets: entries with an id update, entries without
    /// create, rows absent from the set are deleted.
    pub educations: Option<Vec<EducationInput>>,
    pub certifications: Option<Vec<CertificationInput>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EducationInput {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "is required"))]
    pub institution: String,
    #[validate(length(min = 1, message = "is required"))]
    pub degree: String,
    pub field_of_study: Option<String>,
    #[validate(range(min = 1950, max = 2100, message = "is out of range"))]
    pub start_year: Option<i32>,
    #[validate(range(min = 1950, max = 2100, message = "is out of range"))]
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CertificationInput {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    pub issuer: Option<String>,
    pub issued_on: Option<String>,
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct JobBrowseQuery {
    pub category: Option<Uuid>,
    pub location: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentProfileResponse {
    pub student: Student,
    pub educations: Vec<Education>,
    pub certifications: Vec<Certification>,
}

/// Job row enriched with school/category names for the browse listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobListing {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub application_end_date: NaiveDate,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub status: String,
    pub school_name: String,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub applications_by_status: std::collections::HashMap<String, i64>,
    pub upcoming_interviews: Vec<UpcomingInterview>,
    pub unread_notifications: i64,
    pub recent_jobs: Vec<JobListing>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UpcomingInterview {
    pub interview_id: Uuid,
    pub application_id: Uuid,
    pub job_title: String,
    pub title: String,
    pub scheduled_on: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AssessmentView {
    pub core_skill_id: Uuid,
    pub core_skill_name: String,
    pub sub_skill_marks: sqlx::types::Json<std::collections::HashMap<String, i32>>,
    pub total_marks: i32,
}
