// src/models/user.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// DTO for creating a new user (Registration).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Payload returned by `/api/register` and `/api/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,

    /// Anything else the server chose to send back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
