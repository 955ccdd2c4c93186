use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;

/// Postgres SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
pub struct PostgrestErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
}

impl DbError {
    /// Classify a non-success PostgREST response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<PostgrestErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.details.clone().or_else(|| b.message.clone()))
            .unwrap_or_else(|| body.to_string());

        match parsed.as_ref().and_then(|b| b.code.as_deref()) {
            Some(UNIQUE_VIOLATION) => return DbError::UniqueViolation(message),
            Some(FOREIGN_KEY_VIOLATION) => return DbError::ForeignKeyViolation(message),
            _ => {}
        }

        match status {
            401 | 403 => DbError::Auth(message),
            404 => DbError::NotFound(message),
            409 => DbError::UniqueViolation(message),
            _ => DbError::Api { status, message },
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => AppError::Conflict(msg),
            DbError::ForeignKeyViolation(msg) => AppError::BadRequest(msg),
            DbError::NotFound(msg) => AppError::NotFound(msg),
            DbError::Auth(msg) | DbError::Api { message: msg, .. } => AppError::ExternalService(msg),
            other => AppError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn classifies_unique_violation_by_sqlstate() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"appointments_active_slot\"","details":null,"hint":null}"#;
        assert_matches!(DbError::from_response(409, body), DbError::UniqueViolation(msg) if msg.contains("appointments_active_slot"));
    }

    #[test]
    fn classifies_foreign_key_violation_even_on_409() {
        let body = r#"{"code":"23503","message":"insert or update violates foreign key","details":"Key (doctor_id)=(9) is not present"}"#;
        assert_matches!(DbError::from_response(409, body), DbError::ForeignKeyViolation(msg) if msg.contains("doctor_id"));
    }

    #[test]
    fn falls_back_to_status_for_plain_bodies() {
        assert_matches!(DbError::from_response(404, "missing"), DbError::NotFound(_));
        assert_matches!(DbError::from_response(401, "nope"), DbError::Auth(_));
        assert_matches!(DbError::from_response(500, "boom"), DbError::Api { status: 500, .. });
    }
}
