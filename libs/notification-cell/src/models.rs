use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_database::DbError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub doctor_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    pub doctor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("Unauthorized access to notifications")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for NotificationError {
    fn from(err: DbError) -> Self {
        NotificationError::DatabaseError(err.to_string())
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => AppError::NotFound(err.to_string()),
            NotificationError::Unauthorized => AppError::Forbidden(err.to_string()),
            NotificationError::ValidationError(msg) => AppError::BadRequest(msg),
            NotificationError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
