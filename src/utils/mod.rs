//! Shared utilities.
//!
//! - [`errors`]: application error type and handling
//! - [`jwt`]: JWT token creation and verification
//! - [`password`]: password hashing and the secret-verifier seam

pub mod errors;
pub mod jwt;
pub mod password;
