use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::utils::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

/// Capability seam for credential comparison, so the auth service never
/// depends on a concrete hashing scheme.
pub trait SecretVerifier: Send + Sync {
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, AppError>;
}

/// Production verifier. bcrypt's comparison is timing-safe, which keeps
/// wrong-password and unknown-user failures indistinguishable to a caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptVerifier;

impl SecretVerifier for BcryptVerifier {
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, AppError> {
        verify_password(secret, hash)
    }
}
