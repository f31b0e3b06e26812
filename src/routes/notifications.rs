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
pub struct CreateNotificationPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "is required"))]
    pub message: String,
    pub kind: Option<String>,
    pub link: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let user_id = claims.user_id()?;
    let notifications = state.notification_service.list_for_user(user_id).await?;
    Ok(ok("Notifications", notifications))
}

/// Admin-sent notification to a specific user.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateNotificationPayload>,
) -> Result<impl axum::response::IntoResponse> {
    if !claims.role().eq_ignore_ascii_case(ROLE_ADMIN) {
        return Err(Error::Forbidden("Only admins can send notifications".into()));
    }
    payload.validate()?;

    if state
        .user_service
        .get_by_id(payload.user_id)
        .await?
        .is_none()
    {
        return Err(Error::NotFound("Target user not found".into()));
    }

    let notification = state
        .notification_service
        .create(
            payload.user_id,
            &payload.message,
            payload.kind.as_deref().unwrap_or("general"),
            payload.link.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, ok("Notification created", notification)))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let user_id = claims.user_id()?;
    let notification = state.notification_service.mark_as_read(user_id, id).await?;
    Ok(ok("Notification marked as read", notification))
}
