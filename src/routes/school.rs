use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{ok, ok_message};
use crate::dto::school_dto::{
    ApplicationResponse, ApplicationStatusPayload, CreateJobPayload, JobResponse,
    JobStatusPayload, ScheduleInterviewPayload, UpdateJobPayload, UpdateSchoolProfilePayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::school::School;
use crate::AppState;

async fn resolve_school(state: &AppState, claims: &Claims) -> Result<School> {
    let user_id = claims.user_id()?;
    state
        .school_service
        .get_by_user_id(user_id)
        .await?
        .ok_or_else(|| Error::Forbidden("Complete onboarding before using the dashboard".into()))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    Ok(ok("School profile", school))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateSchoolProfilePayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let school = state.school_service.update_profile(user_id, payload).await?;
    Ok(ok("School profile updated", school))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    let jobs = state.job_service.list_for_school(school.id).await?;
    let jobs: Vec<JobResponse> = jobs.into_iter().map(Into::into).collect();
    Ok(ok("Jobs", jobs))
}

pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let school = resolve_school(&state, &claims).await?;
    let end_date = crate::utils::time::parse_date(&payload.application_end_date)
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    if let (Some(min), Some(max)) = (payload.salary_min, payload.salary_max) {
        if min > max {
            return Err(Error::BadRequest(
                "salary_min cannot exceed salary_max".into(),
            ));
        }
    }

    let job = state.job_service.create(school.id, payload, end_date).await?;
    Ok((StatusCode::CREATED, ok("Job created", JobResponse::from(job))))
}

pub async fn get_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    let job = state.job_service.get_owned(school.id, id).await?;
    Ok(ok("Job", JobResponse::from(job)))
}

pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let school = resolve_school(&state, &claims).await?;
    let end_date = match payload.application_end_date.as_deref() {
        Some(raw) => Some(
            crate::utils::time::parse_date(raw).map_err(|e| Error::BadRequest(e.to_string()))?,
        ),
        None => None,
    };
    let job = state
        .job_service
        .update(school.id, id, payload, end_date)
        .await?;
    Ok(ok("Job updated", JobResponse::from(job)))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    state.job_service.delete(school.id, id).await?;
    Ok(ok_message("Job deleted"))
}

pub async fn set_job_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobStatusPayload>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    let job = state
        .job_service
        .set_status(school.id, id, &payload.status)
        .await?;
    Ok(ok("Job status updated", JobResponse::from(job)))
}

pub async fn job_applicants(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    let job = state.job_service.get_owned(school.id, id).await?;
    let applicants = state.application_service.applicants_for_job(job.id).await?;
    Ok(ok("Applicants", applicants))
}

/// Full applicant view for one application: profile, educations,
/// certifications, assessments and any scheduled interview.
pub async fn get_applicant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    let application = state.application_service.get_for_school(school.id, id).await?;

    let student = state
        .student_service
        .get_by_id(application.student_id)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".into()))?;
    let educations = state.student_service.list_educations(student.id).await?;
    let certifications = state.student_service.list_certifications(student.id).await?;
    let assessments = state.skill_service.assessments_for_student(student.id).await?;
    let interview = state.application_service.get_interview(application.id).await?;

    Ok(ok(
        "Applicant",
        serde_json::json!({
            "application": ApplicationResponse::from_parts(application, interview),
            "student": student,
            "educations": educations,
            "certifications": certifications,
            "assessments": assessments,
        }),
    ))
}

async fn notify_student_of_status(
    state: &AppState,
    application: &Application,
    job_title: String,
    status: ApplicationStatus,
) {
    let Ok(Some(contact)) = state.student_service.contact(application.student_id).await else {
        tracing::error!(application = %application.id, "no contact for status notification");
        return;
    };

    let message = format!(
        "Your application for \"{}\" is now {}",
        job_title,
        status.as_str()
    );
    state
        .notification_service
        .notify_quietly(
            contact.user_id,
            &message,
            "application_status",
            Some("/student/applications"),
        )
        .await;

    state.email_service.send_template_detached(
        contact.email.clone(),
        format!("Application update: {}", job_title),
        "status_update",
        vec![
            ("name", contact.display_name()),
            ("job_title", job_title),
            ("status", status.as_str().to_string()),
        ],
    );
}

pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplicationStatusPayload>,
) -> Result<impl axum::response::IntoResponse> {
    let school = resolve_school(&state, &claims).await?;
    let target = ApplicationStatus::parse(&payload.status)
        .ok_or_else(|| Error::BadRequest(format!("Unknown status: {}", payload.status)))?;

    let application = state.application_service.get_for_school(school.id, id).await?;
    let (updated, changed) = state
        .application_service
        .update_status(&application, target)
        .await?;

    if changed {
        let job = state
            .job_service
            .get_by_id(updated.job_id)
            .await?
            .map(|j| j.title)
            .unwrap_or_else(|| "a job".to_string());
        notify_student_of_status(&state, &updated, job, target).await;
    }

    let interview = state.application_service.get_interview(updated.id).await?;
    Ok(ok(
        "Application status updated",
        ApplicationResponse::from_parts(updated, interview),
    ))
}

pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let school = resolve_school(&state, &claims).await?;
    let scheduled_on = crate::utils::time::parse_date(&payload.date)
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    if payload.start_time >= payload.end_time {
        return Err(Error::BadRequest("start_time must be before end_time".into()));
    }

    let application = state.application_service.get_for_school(school.id, id).await?;
    let (updated, interview) = state
        .application_service
        .schedule_interview(
            &application,
            &payload.title,
            scheduled_on,
            &payload.start_time,
            &payload.end_time,
            &payload.location,
        )
        .await?;

    // The student is re-notified on every (re)schedule.
    if let Ok(Some(contact)) = state.student_service.contact(updated.student_id).await {
        let job_title = state
            .job_service
            .get_by_id(updated.job_id)
            .await?
            .map(|j| j.title)
            .unwrap_or_else(|| "a job".to_string());
        let message = format!(
            "Interview for \"{}\" scheduled on {} at {}",
            job_title, interview.scheduled_on, interview.start_time
        );
        state
            .notification_service
            .notify_quietly(
                contact.user_id,
                &message,
                "interview_scheduled",
                Some("/student/applications"),
            )
            .await;
        state.email_service.send_template_detached(
            contact.email.clone(),
            format!("Interview scheduled: {}", job_title),
            "interview_scheduled",
            vec![
                ("name", contact.display_name()),
                ("job_title", job_title),
                ("date", interview.scheduled_on.to_string()),
                ("start_time", interview.start_time.clone()),
                ("end_time", interview.end_time.clone()),
                ("location", interview.location.clone()),
            ],
        );
    }

    Ok(ok(
        "Interview scheduled",
        ApplicationResponse::from_parts(updated, Some(interview)),
    ))
}
