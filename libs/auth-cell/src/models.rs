use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_database::DbError;
use shared_models::auth::Role;
use shared_models::error::AppError;

/// Row of the `users` table. The hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Account plus whatever clinical profile is linked to it.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
}

impl UserProfile {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            mobile: account.mobile.clone(),
            role: account.role,
            patient_id: None,
            doctor_id: None,
            first_name: None,
            last_name: None,
            gender: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedPatient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedDoctor {
    pub id: i64,
    pub name: String,
    pub gender: Option<String>,
}

/// `"Asha Devi Rao"` -> `("Asha", "Devi Rao")`.
pub fn split_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub mobile: String,
    pub role: Option<Role>,
    pub gender: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Admins cannot delete their own account")]
    CannotDeleteSelf,

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(_) => AuthError::EmailTaken,
            other => AuthError::DatabaseError(other.to_string()),
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::UserNotFound => AppError::NotFound(err.to_string()),
            AuthError::CannotDeleteSelf => AppError::BadRequest(err.to_string()),
            AuthError::ValidationError(msg) => AppError::BadRequest(msg),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
            AuthError::Token(msg) | AuthError::PasswordHash(msg) => AppError::Internal(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
