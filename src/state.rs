use std::sync::Arc;

use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::modules::auth::revocation::PgRevocationStore;
use crate::modules::auth::service::AuthService;
use crate::modules::users::store::PgUserStore;
use crate::utils::password::BcryptVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires the auth service with its Postgres-backed collaborators.
    /// Tests use this with a per-test pool and explicit configs.
    pub fn new(db: PgPool, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        let auth = Arc::new(AuthService::new(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgRevocationStore::new(db.clone())),
            Arc::new(BcryptVerifier),
            jwt_config.clone(),
        ));

        Self {
            db,
            jwt_config,
            cors_config,
            auth,
        }
    }
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;
    let jwt_config = JwtConfig::from_env();

    // Denylist rows for tokens past the refresh window can never block a
    // verifiable token again; drop them on startup.
    let revocations = PgRevocationStore::new(db.clone());
    match revocations
        .purge_expired(jwt_config.refresh_window_minutes)
        .await
    {
        Ok(count) if count > 0 => tracing::info!(count, "Purged expired revocation records"),
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to purge expired revocation records: {}", e.error),
    }

    AppState::new(db, jwt_config, CorsConfig::from_env())
}
