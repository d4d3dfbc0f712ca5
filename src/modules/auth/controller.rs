use axum::Json;
use axum::extract::State;
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::{AuthUser, BearerToken};
use crate::modules::users::model::User;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{LoginRequest, MessageResponse, TokenResponse};

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login by email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[instrument]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = state.auth.login(dto).await?;
    Ok(Json(response))
}

/// Finish the current session by revoking the presented token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Successfully logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
#[instrument]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.logout(&auth_user.0).await?;
    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

/// Exchange the presented token for a fresh one
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Given new access token", body = TokenResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
#[instrument]
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<TokenResponse>, AppError> {
    let response = state.auth.refresh(&token).await?;
    Ok(Json(response))
}

/// Get the logged-in user's information
#[utoipa::path(
    post,
    path = "/auth/user-info",
    responses(
        (status = 200, description = "Logged-in user information", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
#[instrument]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = state.auth.me(&auth_user.0).await?;
    Ok(Json(user))
}
