//! Request extractors for bearer-token authentication.
//!
//! 1. Client sends a request with an `Authorization: Bearer <token>` header
//! 2. [`auth::AuthUser`] verifies the JWT against the auth service
//!    (signature, expiry, denylist) and extracts the claims
//! 3. The handler executes with the verified claims
//!
//! [`auth::BearerToken`] is the unverified variant used by the refresh
//! endpoint.

pub mod auth;
