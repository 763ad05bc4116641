//! Session and sign-up models for the auth provider.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::profile::Role;

/// Authenticated user identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider user ID (UUID string)
    pub id: String,
    /// Email address (may be absent for some identity types)
    pub email: Option<String>,
}

/// An authenticated session: token pair plus the user it belongs to.
///
/// Both tokens always travel together; the session store never exposes
/// an access token from one generation with a refresh token from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp, seconds)
    pub expires_at: i64,
    pub user: AuthUser,
}

/// Sign-up request payload, validated locally before it goes on the wire.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct SignUp {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    /// Initial role recorded in the user metadata at registration
    pub role: Role,
}
