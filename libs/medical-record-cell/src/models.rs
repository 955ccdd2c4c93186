use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_database::DbError;
use shared_models::error::AppError;

/// Embedded columns requested alongside every record read.
pub const RECORD_SELECT: &str = "*,patients(first_name,last_name,gender,dob),doctors(name)";

#[derive(Debug, Clone, Deserialize)]
pub struct PatientSummary {
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSummary {
    pub name: String,
}

/// Row as PostgREST returns it, with the patient and doctor embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicalRecordRow {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub diagnosis: String,
    /// Structured list of drugs or free text, whatever the doctor entered.
    pub prescription: Option<Value>,
    pub tests: Option<String>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
    pub visit_date: DateTime<Utc>,
    #[serde(default)]
    pub patients: Option<PatientSummary>,
    #[serde(default)]
    pub doctors: Option<DoctorSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_gender: String,
    pub patient_age: Option<u32>,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub diagnosis: String,
    pub prescription: Option<Value>,
    pub tests: Option<String>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
    pub visit_date: DateTime<Utc>,
}

impl MedicalRecordRow {
    pub fn into_record(self, today: NaiveDate) -> MedicalRecord {
        let (patient_name, patient_gender, patient_age) = match &self.patients {
            Some(p) => (
                format!("{} {}", p.first_name, p.last_name).trim().to_string(),
                p.gender.clone().unwrap_or_else(|| "Unknown".to_string()),
                p.dob.and_then(|dob| age_on(dob, today)),
            ),
            None => ("Unknown".to_string(), "Unknown".to_string(), None),
        };

        MedicalRecord {
            id: self.id,
            patient_id: self.patient_id,
            patient_name,
            patient_gender,
            patient_age,
            doctor_id: self.doctor_id,
            doctor_name: self.doctors.map(|d| d.name).unwrap_or_else(|| "Unknown".to_string()),
            diagnosis: self.diagnosis,
            prescription: self.prescription,
            tests: self.tests,
            notes: self.notes,
            symptoms: self.symptoms,
            visit_date: self.visit_date,
        }
    }
}

/// Whole years between `dob` and `today`; `None` for a future birth date.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    today.years_since(dob)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMedicalRecordRequest {
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub diagnosis: String,
    pub prescription: Option<Value>,
    pub tests: Option<String>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMedicalRecordRequest {
    pub diagnosis: Option<String>,
    pub prescription: Option<Value>,
    pub tests: Option<String>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicalRecordQuery {
    pub patient_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum MedicalRecordError {
    #[error("Medical record not found")]
    NotFound,

    #[error("Patient or doctor does not exist")]
    UnknownReference,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for MedicalRecordError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ForeignKeyViolation(_) => MedicalRecordError::UnknownReference,
            other => MedicalRecordError::DatabaseError(other.to_string()),
        }
    }
}

impl From<MedicalRecordError> for AppError {
    fn from(err: MedicalRecordError) -> Self {
        match err {
            MedicalRecordError::NotFound => AppError::NotFound(err.to_string()),
            MedicalRecordError::UnknownReference => AppError::BadRequest(err.to_string()),
            MedicalRecordError::ValidationError(msg) => AppError::BadRequest(msg),
            MedicalRecordError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn age_counts_whole_years() {
        let dob = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), Some(33));
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), Some(34));
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()), None);
    }

    #[test]
    fn embedded_names_are_flattened() {
        let row: MedicalRecordRow = serde_json::from_value(json!({
            "id": 1,
            "patient_id": 3,
            "doctor_id": 5,
            "diagnosis": "Flu",
            "prescription": "Rest and fluids",
            "tests": null,
            "notes": null,
            "symptoms": "fever",
            "visit_date": "2024-01-10T09:30:00Z",
            "patients": { "first_name": "Asha", "last_name": "Rao", "gender": "Female", "dob": "1990-06-15" },
            "doctors": { "name": "Dr. Mehta" }
        })).unwrap();

        let record = row.into_record(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(record.patient_name, "Asha Rao");
        assert_eq!(record.patient_age, Some(34));
        assert_eq!(record.doctor_name, "Dr. Mehta");
        assert_eq!(record.prescription, Some(json!("Rest and fluids")));
    }

    #[test]
    fn missing_embeds_fall_back_to_unknown() {
        let row: MedicalRecordRow = serde_json::from_value(json!({
            "id": 1, "patient_id": 3, "doctor_id": 5, "diagnosis": "Flu",
            "prescription": null, "tests": null, "notes": null, "symptoms": null,
            "visit_date": "2024-01-10T09:30:00Z"
        })).unwrap();

        let record = row.into_record(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(record.patient_name, "Unknown");
        assert_eq!(record.patient_age, None);
    }
}
