// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// The authenticated account as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    /// Login email.
    pub email: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Body of login and register calls.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Email must be a valid address."))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password length must be between 1 and 128 characters."
    ))]
    pub password: String,
}

/// Response of login, register and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: User,
}
