use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::validation::{require_non_blank, validate_email, validate_phone};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub contact_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

impl CreatePatientRequest {
    /// Check required fields and formats; returns the parsed date of birth.
    pub fn validate(&self) -> Result<NaiveDate, String> {
        require_non_blank(&self.first_name, "First name")?;
        require_non_blank(&self.last_name, "Last name")?;

        let dob = match self.dob.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_dob(raw)?,
            _ => return Err("Date of birth is required".to_string()),
        };

        if let Some(email) = self.normalized_email() {
            validate_email(&email)?;
        }

        match self.contact_number.as_deref() {
            Some(contact) if !contact.trim().is_empty() => validate_phone(contact)?,
            _ => return Err("Contact number is required".to_string()),
        }

        Ok(dob)
    }

    /// Blank email is stored as null so it does not collide on the unique index.
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

pub fn parse_dob(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD".to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientListQuery {
    pub doctor_id: Option<i64>,
    /// Case-insensitive match on first or last name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("A patient with this email already exists")]
    EmailAlreadyExists,

    #[error("Unauthorized access to patient data")]
    Unauthorized,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for PatientError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(_) => PatientError::EmailAlreadyExists,
            other => PatientError::DatabaseError(other.to_string()),
        }
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists => AppError::Conflict(err.to_string()),
            PatientError::Unauthorized => AppError::Forbidden(err.to_string()),
            PatientError::ValidationError(msg) => AppError::BadRequest(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
