use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{
    CategoryResponse, CoreSkillResponse, CreateCategoryPayload, CreateCoreSkillPayload,
    CreateUserPayload, EmailTemplatePayload, SubskillLimitPayload, UpdateCategoryPayload,
    UpdateCoreSkillPayload, UserListQuery,
};
use crate::dto::auth_dto::UserResponse;
use crate::dto::common::{ok, ok_message};
use crate::error::{Error, Result};
use crate::models::setting::SUBSKILL_MARK_LIMIT_KEY;
use crate::models::user::{ROLE_SCHOOL, ROLE_STUDENT};
use crate::services::email_service::default_template;
use crate::services::export_service::ExportService;
use crate::services::import_service::{
    self, ImportSummary, SheetRow,
};
use crate::utils::{crypto, upload};
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let users = state.user_service.list(query).await?;
    let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(ok("User list", users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    if payload.role != ROLE_SCHOOL && payload.role != ROLE_STUDENT {
        return Err(Error::BadRequest(
            "Role must be either school or student".into(),
        ));
    }

    let email = payload.email.to_lowercase();
    let temp_password = crypto::generate_temp_password(10);
    let password_hash = crypto::hash_password(&temp_password)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

    let user = state
        .user_service
        .create_with_profile(&payload.name, &email, &password_hash, &payload.role)
        .await?;

    state.email_service.send_template_detached(
        email,
        "Your placement portal account".into(),
        "welcome",
        vec![
            ("name", payload.name),
            ("email", user.email.clone()),
            ("password", temp_password),
        ],
    );

    Ok((
        StatusCode::CREATED,
        ok("User created", UserResponse::from(user)),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let user = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    Ok(ok("User", UserResponse::from(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.user_service.delete(id).await?;
    Ok(ok_message("User deleted"))
}

async fn read_uploaded_sheet(multipart: &mut Multipart) -> Result<(Vec<SheetRow>, Option<String>)> {
    let mut sheet_path: Option<String> = None;
    let mut default_role: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.xlsx").to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    let path = upload::save_upload(upload::SPREADSHEET, &filename, &data).await?;
                    sheet_path = Some(path);
                }
            }
            "role" => default_role = Some(field.text().await.unwrap_or_default()),
            _ => {}
        }
    }

    let relative = sheet_path.ok_or_else(|| Error::BadRequest("A spreadsheet file is required".into()))?;
    let full_path = format!("{}/{}", crate::config::get_config().uploads_dir, relative);

    // The temp file is removed whatever happens to the parse.
    let parsed = import_service::read_sheet_from_path(&full_path);
    let rows = match parsed {
        Ok(rows) => rows,
        Err(e) => {
            upload::remove_quietly(&relative).await;
            return Err(e);
        }
    };
    upload::remove_quietly(&relative).await;
    Ok((rows, default_role))
}

/// Bulk user creation from a spreadsheet. Rows fail individually; the
/// batch always runs to the end and reports per-row reasons.
pub async fn bulk_create_users(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    let (rows, default_role) = read_uploaded_sheet(&mut multipart).await?;
    let default_role = default_role.unwrap_or_else(|| ROLE_STUDENT.to_string());
    if default_role != ROLE_SCHOOL && default_role != ROLE_STUDENT {
        return Err(Error::BadRequest(format!(
            "Unknown default role: {}",
            default_role
        )));
    }

    let mut summary = ImportSummary::default();
    for row in &rows {
        let record = match import_service::validate_user_row(row, &default_role) {
            Ok(record) => record,
            Err(reason) => {
                summary.record_failure(row.number, row.cells.get("email").cloned(), reason);
                continue;
            }
        };

        if state
            .user_service
            .get_by_email(&record.email)
            .await?
            .is_some()
        {
            summary.record_failure(
                row.number,
                Some(record.email),
                "A user with this email already exists",
            );
            continue;
        }

        let temp_password = crypto::generate_temp_password(10);
        let password_hash = crypto::hash_password(&temp_password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        match state
            .user_service
            .create_with_profile(&record.name, &record.email, &password_hash, &record.role)
            .await
        {
            Ok(user) => {
                state.email_service.send_template_detached(
                    user.email.clone(),
                    "Your placement portal account".into(),
                    "welcome",
                    vec![
                        ("name", record.name),
                        ("email", user.email.clone()),
                        ("password", temp_password),
                    ],
                );
                summary.record_ok();
            }
            Err(e) => {
                summary.record_failure(row.number, Some(record.email), e.to_string());
            }
        }
    }

    tracing::info!(
        uploaded = summary.uploaded_count,
        failed = summary.failed_count,
        "bulk user upload processed"
    );
    Ok(ok("Bulk user upload processed", summary))
}

/// Bulk sub-skill mark upload for one core skill. A row is applied only
/// when every sub-skill has an in-range mark; otherwise it fails whole.
pub async fn bulk_marks_upload(
    State(state): State<AppState>,
    Path(core_skill_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    let skill = state
        .skill_service
        .get_by_id(core_skill_id)
        .await?
        .ok_or_else(|| Error::NotFound("Core skill not found".into()))?;
    let ceiling = state.settings_service.subskill_mark_limit().await?;

    let (rows, _) = read_uploaded_sheet(&mut multipart).await?;

    let mut summary = ImportSummary::default();
    for row in &rows {
        let (email, marks) =
            match import_service::validate_mark_row(row, &skill.sub_skills.0, ceiling) {
                Ok(valid) => valid,
                Err(reason) => {
                    summary.record_failure(row.number, row.cells.get("email").cloned(), reason);
                    continue;
                }
            };

        let Some(student) = state.student_service.get_by_email(&email).await? else {
            summary.record_failure(row.number, Some(email), "No student with this email");
            continue;
        };

        match state
            .skill_service
            .upsert_assessment(student.id, skill.id, marks)
            .await
        {
            Ok(_) => summary.record_ok(),
            Err(e) => summary.record_failure(row.number, Some(email), e.to_string()),
        }
    }

    tracing::info!(
        skill = %skill.name,
        uploaded = summary.uploaded_count,
        failed = summary.failed_count,
        "bulk mark upload processed"
    );
    Ok(ok("Bulk mark upload processed", summary))
}

pub async fn list_skills(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    let skills = state.skill_service.list().await?;
    let skills: Vec<CoreSkillResponse> = skills.into_iter().map(Into::into).collect();
    Ok(ok("Core skills", skills))
}

pub async fn create_skill(
    State(state): State<AppState>,
    Json(payload): Json<CreateCoreSkillPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let skill = state.skill_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        ok("Core skill created", CoreSkillResponse::from(skill)),
    ))
}

pub async fn update_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoreSkillPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let skill = state.skill_service.update(id, payload).await?;
    Ok(ok("Core skill updated", CoreSkillResponse::from(skill)))
}

pub async fn delete_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.skill_service.delete(id).await?;
    Ok(ok_message("Core skill deleted"))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    let categories = state.category_service.list().await?;
    Ok(ok("Categories", categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let category: CategoryResponse = state.category_service.create(payload).await?;
    Ok((StatusCode::CREATED, ok("Category created", category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let category = state.category_service.update(id, payload).await?;
    Ok(ok("Category updated", category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.category_service.delete(id).await?;
    Ok(ok_message("Category deleted"))
}

pub async fn get_subskill_limit(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    let limit = state.settings_service.subskill_mark_limit().await?;
    Ok(ok("Sub-skill mark limit", serde_json::json!({ "limit": limit })))
}

pub async fn set_subskill_limit(
    State(state): State<AppState>,
    Json(payload): Json<SubskillLimitPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    state
        .settings_service
        .set(SUBSKILL_MARK_LIMIT_KEY, &payload.limit.to_string())
        .await?;
    Ok(ok(
        "Sub-skill mark limit updated",
        serde_json::json!({ "limit": payload.limit }),
    ))
}

pub async fn get_email_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl axum::response::IntoResponse> {
    let value = state
        .settings_service
        .email_template(&key)
        .await?
        .unwrap_or_else(|| default_template(&key).to_string());
    Ok(ok(
        "Email template",
        serde_json::json!({ "key": key, "value": value }),
    ))
}

pub async fn set_email_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<EmailTemplatePayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let full_key = format!("email_template.{}", key);
    let setting = state.settings_service.set(&full_key, &payload.value).await?;
    Ok(ok(
        "Email template updated",
        serde_json::json!({ "key": key, "value": setting.value }),
    ))
}

pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    let users_by_role = state.user_service.counts_by_role().await?;
    let jobs_by_status = state.job_service.counts_by_status().await?;
    let applications_by_status = state.application_service.counts_by_status().await?;
    let open_help_requests = state.help_service.open_count().await?;

    Ok(ok(
        "Dashboard",
        serde_json::json!({
            "users_by_role": users_by_role,
            "jobs_by_status": jobs_by_status,
            "applications_by_status": applications_by_status,
            "open_help_requests": open_help_requests,
        }),
    ))
}

pub async fn export_users(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    let users = state.user_service.list(UserListQuery::default()).await?;
    let buffer = ExportService::generate_users_xlsx(&users)?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"users.xlsx\"",
        ),
    ];
    Ok((headers, buffer))
}
