use std::env;

/// JWT issuing configuration.
///
/// The TTL is configured in minutes and reported to clients as seconds
/// (`expires_in = ttl_minutes * 60`). The refresh window bounds how long
/// after issuance a token may still be exchanged for a fresh one, even if
/// it has expired in between.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub refresh_window_minutes: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            ttl_minutes: env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60), // 1 hour
            refresh_window_minutes: env::var("JWT_REFRESH_WINDOW_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20160), // 2 weeks
        }
    }
}
