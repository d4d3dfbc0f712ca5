use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::User;
use crate::modules::users::store::UserStore;
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_access_token, decode_for_refresh, verify_token};
use crate::utils::password::SecretVerifier;

use super::model::{Claims, LoginRequest, TokenResponse};
use super::revocation::RevocationStore;

/// The token auth service. All four operations plus `authenticate` (the
/// extractor's entry point) live here; collaborators are injected so there
/// is no ambient auth context anywhere in the crate.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    revocations: Arc<dyn RevocationStore>,
    verifier: Arc<dyn SecretVerifier>,
    jwt_config: JwtConfig,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt_config", &self.jwt_config)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        revocations: Arc<dyn RevocationStore>,
        verifier: Arc<dyn SecretVerifier>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            users,
            revocations,
            verifier,
            jwt_config,
        }
    }

    /// Verifies credentials and issues a fresh token.
    ///
    /// Unknown email and wrong password produce the same response, so the
    /// endpoint cannot be used to probe which addresses have accounts.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn login(&self, dto: LoginRequest) -> Result<TokenResponse, AppError> {
        let record = self
            .users
            .find_by_email(&dto.email)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid email or password".to_string()))?;

        let is_valid = self.verifier.verify(&dto.password, &record.password)?;

        if !is_valid {
            return Err(AppError::unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let access_token = create_access_token(record.id, &record.email, &self.jwt_config)?;

        Ok(self.token_response(access_token))
    }

    /// Verifies a presented token end to end: signature, expiry, denylist.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        let claims = verify_token(token, &self.jwt_config)?;

        if self.revocations.is_revoked(claims.jti).await? {
            return Err(AppError::unauthorized("Token has been revoked".to_string()));
        }

        Ok(claims)
    }

    /// Resolves the token's subject back to a user record.
    #[instrument(skip_all, fields(sub = %claims.sub))]
    pub async fn me(&self, claims: &Claims) -> Result<User, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists".to_string()))
    }

    /// Revokes the presented token. The caller has already been verified by
    /// the extractor, so a second logout with the same token never reaches
    /// this point: the denylist check fails it with 401 first.
    #[instrument(skip_all, fields(jti = %claims.jti))]
    pub async fn logout(&self, claims: &Claims) -> Result<(), AppError> {
        self.revocations
            .revoke(claims.jti, exp_timestamp(claims.exp))
            .await?;

        Ok(())
    }

    /// Exchanges a token for a fresh one, revoking the old one.
    ///
    /// An expired token is still refreshable until `iat` plus the configured
    /// refresh window has passed; signature and revocation are always
    /// enforced. Revoking the old token doubles as the rotation claim:
    /// if the denylist row already existed the token was spent, so of any
    /// concurrent refreshes of the same token exactly one succeeds.
    #[instrument(skip_all)]
    pub async fn refresh(&self, token: &str) -> Result<TokenResponse, AppError> {
        let claims = decode_for_refresh(token, &self.jwt_config)?;

        let now = Utc::now().timestamp();
        let window_end = claims.iat as i64 + self.jwt_config.refresh_window_minutes * 60;
        if now >= window_end {
            return Err(AppError::unauthorized(
                "Token is no longer refreshable".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))?;

        let newly_revoked = self
            .revocations
            .revoke(claims.jti, exp_timestamp(claims.exp))
            .await?;

        if !newly_revoked {
            return Err(AppError::unauthorized("Token has been revoked".to_string()));
        }

        let access_token = create_access_token(user_id, &claims.email, &self.jwt_config)?;

        Ok(self.token_response(access_token))
    }

    pub fn expires_in(&self) -> i64 {
        self.jwt_config.ttl_minutes * 60
    }

    fn token_response(&self, access_token: String) -> TokenResponse {
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.expires_in(),
        }
    }
}

fn exp_timestamp(exp: usize) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(exp as i64, 0).unwrap_or_else(Utc::now)
}
