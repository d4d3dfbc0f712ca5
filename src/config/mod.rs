//! Configuration modules, loaded from environment variables.
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: signing secret, token TTL, refresh window

pub mod cors;
pub mod database;
pub mod jwt;
