use serde::{Deserialize, Serialize};

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::validation::{require_non_blank, validate_phone};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub specialization: String,
    pub gender: Option<String>,
    pub contact: Option<String>,
    /// Free text shown to the front desk, e.g. "Mon-Fri 09:00-17:00".
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub availability: Option<String>,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_blank(&self.name, "Name")?;
        require_non_blank(&self.specialization, "Specialization")?;
        if let Some(contact) = self.contact.as_deref().filter(|c| !c.trim().is_empty()) {
            validate_phone(contact)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchFilters {
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for DoctorError {
    fn from(err: DbError) -> Self {
        DoctorError::DatabaseError(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::ValidationError(msg) => AppError::BadRequest(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_specialization_are_required() {
        let mut request = CreateDoctorRequest {
            name: "Dr. Mehta".to_string(),
            specialization: "Cardiology".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        request.specialization = String::new();
        assert_eq!(request.validate().unwrap_err(), "Specialization is required");
    }

    #[test]
    fn contact_is_checked_when_present() {
        let request = CreateDoctorRequest {
            name: "Dr. Mehta".to_string(),
            specialization: "Cardiology".to_string(),
            contact: Some("5550000".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
