use keygate::config::cors::CorsConfig;
use keygate::config::jwt::JwtConfig;
use keygate::router::init_router;
use keygate::state::AppState;
use keygate::utils::password::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Insert a user directly, the way the create-user command would.
pub async fn create_test_user(pool: &PgPool, email: &str, password: &str) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (first_name, last_name, email, password)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind("Test")
    .bind("User")
    .bind(email)
    .bind(&hashed)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        ttl_minutes: 60,
        refresh_window_minutes: 20160,
    }
}

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    let state = AppState::new(pool, test_jwt_config(), CorsConfig::default());
    init_router(state)
}
