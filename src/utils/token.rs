use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

pub fn issue_token(user_id: Uuid, role: &str) -> Result<String> {
    let config = crate::config::get_config();
    let exp = chrono::Utc::now() + chrono::Duration::hours(config.jwt_expiry_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.timestamp() as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))
}
