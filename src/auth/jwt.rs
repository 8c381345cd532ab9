use crate::error::{AppError, Result};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the platform's anon and service-role keys.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub role: Option<String>,
    pub exp: i64,
}

/// Verify a trigger token (HS256) and extract its claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    // User session tokens carry an audience, platform keys do not.
    let mut validation = Validation::default();
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
pub fn create_test_token(secret: &str, role: &str, expires_in: chrono::Duration) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        role: Some(role.to_string()),
        exp: (chrono::Utc::now() + expires_in).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
