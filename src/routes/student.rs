use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ok;
use crate::dto::student_dto::{
    JobBrowseQuery, StudentDashboard, StudentProfileResponse, UpdateStudentProfilePayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::student::Student;
use crate::utils::upload;
use crate::AppState;

async fn resolve_student(state: &AppState, claims: &Claims) -> Result<Student> {
    let user_id = claims.user_id()?;
    state
        .student_service
        .get_by_user_id(user_id)
        .await?
        .ok_or_else(|| Error::Forbidden("Complete onboarding before using the dashboard".into()))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let student = resolve_student(&state, &claims).await?;
    let user_id = claims.user_id()?;

    let applications_by_status = state
        .application_service
        .counts_for_student(student.id)
        .await?;
    let upcoming_interviews = state
        .application_service
        .upcoming_interviews(student.id)
        .await?;
    let unread_notifications = state.notification_service.unread_count(user_id).await?;
    let recent_jobs = state.job_service.recent_open(5).await?;

    Ok(ok(
        "Dashboard",
        StudentDashboard {
            applications_by_status,
            upcoming_interviews,
            unread_notifications,
            recent_jobs,
        },
    ))
}

pub async fn browse_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobBrowseQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let jobs = state.job_service.browse_open(query).await?;
    Ok(ok("Open jobs", jobs))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let job = state
        .job_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
    let school = state.school_service.get_by_id(job.school_id).await?;

    Ok(ok(
        "Job",
        serde_json::json!({
            "job": crate::dto::school_dto::JobResponse::from(job),
            "school_name": school.map(|s| s.name),
        }),
    ))
}

/// Applies to a job: multipart with an optional resume file and an
/// optional cover_letter text field. Falls back to the profile resume
/// when no file is uploaded.
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    let student = resolve_student(&state, &claims).await?;
    let job = state
        .job_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;

    let mut cover_letter: Option<String> = None;
    let mut resume_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "cover_letter" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    cover_letter = Some(text);
                }
            }
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.bin").to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    let path = upload::save_upload(upload::RESUME, &filename, &data).await?;
                    resume_url = Some(crate::config::get_config().public_upload_url(&path));
                }
            }
            _ => {}
        }
    }

    let resume_url = resume_url.or_else(|| student.resume_url.clone());
    let application = state
        .application_service
        .apply(student.id, &job, cover_letter, resume_url)
        .await?;

    // Let the school know, off the request path.
    if let Some(school) = state.school_service.get_by_id(job.school_id).await? {
        let message = format!("New application received for \"{}\"", job.title);
        state
            .notification_service
            .notify_quietly(
                school.user_id,
                &message,
                "application_received",
                Some("/school/jobs"),
            )
            .await;
        if let Some(school_user) = state.user_service.get_by_id(school.user_id).await? {
            state.email_service.send_template_detached(
                school_user.email,
                format!("New application: {}", job.title),
                "application_received",
                vec![("name", school.name), ("job_title", job.title.clone())],
            );
        }
    }

    Ok((StatusCode::CREATED, ok("Application submitted", application)))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let student = resolve_student(&state, &claims).await?;
    let applications = state
        .application_service
        .list_for_student(student.id)
        .await?;
    Ok(ok("Applications", applications))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let student = resolve_student(&state, &claims).await?;
    let educations = state.student_service.list_educations(student.id).await?;
    let certifications = state.student_service.list_certifications(student.id).await?;
    Ok(ok(
        "Student profile",
        StudentProfileResponse {
            student,
            educations,
            certifications,
        },
    ))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateStudentProfilePayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    if let Some(ref educations) = payload.educations {
        for entry in educations {
            entry.validate()?;
        }
    }
    if let Some(ref certifications) = payload.certifications {
        for entry in certifications {
            entry.validate()?;
        }
    }

    let student = resolve_student(&state, &claims).await?;
    let updated = state.student_service.update_profile(&student, payload).await?;
    let educations = state.student_service.list_educations(updated.id).await?;
    let certifications = state.student_service.list_certifications(updated.id).await?;

    Ok(ok(
        "Student profile updated",
        StudentProfileResponse {
            student: updated,
            educations,
            certifications,
        },
    ))
}

pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let student = resolve_student(&state, &claims).await?;
    let assessments = state.skill_service.assessments_for_student(student.id).await?;
    Ok(ok("Skill assessments", assessments))
}
