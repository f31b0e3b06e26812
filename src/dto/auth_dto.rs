use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;
use crate::utils::validation::{validate_mobile, validate_pincode};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            onboarding_complete: value.onboarding_complete,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// `profileData` JSON carried in the onboarding multipart request,
/// interpreted per the caller's role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentProfileData {
    #[validate(length(min = 1, message = "is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub last_name: String,
    #[validate(custom(function = validate_mobile))]
    pub mobile: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SchoolProfileData {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    pub bio: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom(function = validate_pincode))]
    pub pincode: Option<String>,
}
