use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login, logout, me, refresh};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/user-info", post(me))
}
