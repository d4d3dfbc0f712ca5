use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;
use crate::utils::errors::AppError;

/// Signs a fresh access token for the given user.
///
/// Every token carries a unique `jti` so it can be revoked individually
/// on logout or refresh.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now + jwt_config.ttl_minutes * 60;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        jti: Uuid::new_v4(),
        exp: exp as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Full verification: signature and expiry. Revocation is checked separately
/// by the auth service, since it needs the denylist store.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

/// Decodes a token for refresh: the signature must verify but `exp` is not
/// enforced here. The service applies the refresh window to `iat` instead.
pub fn decode_for_refresh(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid token".to_string()))
}
