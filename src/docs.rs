use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, MessageResponse, TokenResponse};
use crate::modules::users::model::User;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::me,
    ),
    components(
        schemas(
            LoginRequest,
            TokenResponse,
            MessageResponse,
            ErrorResponse,
            User,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication token endpoints")
    ),
    info(
        title = "Keygate API",
        version = "0.1.0",
        description = "JWT token auth service: login, logout, refresh, user-info.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
