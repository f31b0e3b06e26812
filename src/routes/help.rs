use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ok;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::ROLE_ADMIN;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHelpRequestPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "is required"))]
    pub message: String,
}

/// Admins see every request; everyone else sees their own.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let requests = if claims.role().eq_ignore_ascii_case(ROLE_ADMIN) {
        state.help_service.list_all().await?
    } else {
        state.help_service.list_for_user(claims.user_id()?).await?
    };
    Ok(ok("Help requests", requests))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateHelpRequestPayload>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let request = state
        .help_service
        .create(user_id, &payload.subject, &payload.message)
        .await?;
    Ok((StatusCode::CREATED, ok("Help request created", request)))
}

pub async fn resolve(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    if !claims.role().eq_ignore_ascii_case(ROLE_ADMIN) {
        return Err(Error::Forbidden("Only admins can resolve help requests".into()));
    }

    let request = state.help_service.resolve(id).await?;

    let message = format!("Your help request \"{}\" has been resolved", request.subject);
    state
        .notification_service
        .notify_quietly(request.user_id, &message, "help_resolved", Some("/help"))
        .await;
    if let Some(user) = state.user_service.get_by_id(request.user_id).await? {
        state.email_service.send_template_detached(
            user.email,
            "Your help request has been resolved".into(),
            "help_resolved",
            vec![("name", user.name), ("subject", request.subject.clone())],
        );
    }

    Ok(ok("Help request resolved", request))
}
