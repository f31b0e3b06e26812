use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::dto::auth_dto::{
    AuthResponse, LoginPayload, RegisterPayload, SchoolProfileData, StudentProfileData,
    UserResponse,
};
use crate::dto::common::{ok, ApiResponse};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{ROLE_SCHOOL, ROLE_STUDENT};
use crate::utils::{crypto, token, upload};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    if payload.role != ROLE_SCHOOL && payload.role != ROLE_STUDENT {
        return Err(Error::BadRequest(
            "Role must be either school or student".into(),
        ));
    }

    let password_hash = crypto::hash_password(&payload.password)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
    let user = state
        .user_service
        .create_with_profile(
            &payload.name,
            &payload.email.to_lowercase(),
            &password_hash,
            &payload.role,
        )
        .await?;

    let token = token::issue_token(user.id, &user.role)?;
    Ok((
        StatusCode::CREATED,
        ok(
            "Registered successfully",
            AuthResponse {
                token,
                user: user.into(),
            },
        ),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let user = state
        .user_service
        .get_by_email(&payload.email.to_lowercase())
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".into()))?;

    let valid = crypto::verify_password(&payload.password, &user.password_hash)
        .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        return Err(Error::Unauthorized("Invalid email or password".into()));
    }

    let token = token::issue_token(user.id, &user.role)?;
    Ok(ok(
        "Logged in successfully",
        AuthResponse {
            token,
            user: user.into(),
        },
    ))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let user_id = claims.user_id()?;
    let user = state
        .user_service
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

    let profile = match user.role.as_str() {
        ROLE_STUDENT => state
            .student_service
            .get_by_user_id(user_id)
            .await?
            .map(|s| serde_json::to_value(s))
            .transpose()?,
        ROLE_SCHOOL => state
            .school_service
            .get_by_user_id(user_id)
            .await?
            .map(|s| serde_json::to_value(s))
            .transpose()?,
        _ => None,
    };

    Ok(ok(
        "Current user",
        serde_json::json!({
            "user": UserResponse::from(user),
            "profile": profile,
        }),
    ))
}

/// One-time profile completion: multipart with a `profileData` JSON field
/// interpreted per the caller's role, plus an optional image upload.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    let user_id = claims.user_id()?;
    let user = state
        .user_service
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    if user.onboarding_complete {
        return Err(Error::BadRequest("Onboarding is already complete".into()));
    }

    let mut profile_data: Option<String> = None;
    let mut image_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "profileData" => profile_data = Some(field.text().await.unwrap_or_default()),
            "image" => {
                let filename = field.file_name().unwrap_or("image.bin").to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    let path = upload::save_upload(upload::PROFILE_IMAGE, &filename, &data).await?;
                    image_url = Some(crate::config::get_config().public_upload_url(&path));
                }
            }
            _ => {}
        }
    }

    let raw = profile_data
        .ok_or_else(|| Error::BadRequest("profileData is required".into()))?;

    let profile = match user.role.as_str() {
        ROLE_STUDENT => {
            let data: StudentProfileData = serde_json::from_str(&raw)?;
            data.validate()?;
            let student = state
                .student_service
                .fill_onboarding_profile(
                    user_id,
                    &data.first_name,
                    &data.last_name,
                    data.mobile.as_deref(),
                    data.bio.as_deref(),
                    data.skills.as_deref(),
                    image_url.as_deref(),
                )
                .await?;
            serde_json::to_value(student)?
        }
        ROLE_SCHOOL => {
            let data: SchoolProfileData = serde_json::from_str(&raw)?;
            data.validate()?;
            let school = state
                .school_service
                .fill_onboarding_profile(
                    user_id,
                    &data.name,
                    data.bio.as_deref(),
                    data.website.as_deref(),
                    data.address_line.as_deref(),
                    data.city.as_deref(),
                    data.state.as_deref(),
                    data.pincode.as_deref(),
                    image_url.as_deref(),
                )
                .await?;
            serde_json::to_value(school)?
        }
        other => {
            return Err(Error::BadRequest(format!(
                "Role {} has no onboarding profile",
                other
            )))
        }
    };

    state.user_service.mark_onboarding_complete(user_id).await?;
    tracing::info!(user = %user_id, "onboarding completed");

    Ok(ok("Onboarding completed", profile))
}
