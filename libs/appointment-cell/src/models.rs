// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_database::DbError;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub serial_number: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> Slot {
        Slot::new(self.doctor_id, self.date, self.time)
    }

    /// Occupies its slot unless cancelled.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// Embedded names requested alongside appointment reads and writes.
pub const APPOINTMENT_SELECT: &str = "*,patients(first_name,last_name),doctors(name)";

#[derive(Debug, Clone, Deserialize)]
pub struct PatientName {
    pub first_name: String,
    pub last_name: String,
}

impl PatientName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorName {
    pub name: String,
}

/// Row as PostgREST returns it with `APPOINTMENT_SELECT`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRow {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(default)]
    pub patients: Option<PatientName>,
    #[serde(default)]
    pub doctors: Option<DoctorName>,
}

impl AppointmentRow {
    pub fn into_details(self) -> AppointmentDetails {
        AppointmentDetails::new(self.appointment, self.patients.as_ref(), self.doctors.as_ref())
    }
}

/// Appointment as returned to clients, with display names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub doctor_name: String,
}

impl AppointmentDetails {
    pub fn new(appointment: Appointment, patient: Option<&PatientName>, doctor: Option<&DoctorName>) -> Self {
        Self {
            appointment,
            patient_name: patient.map(PatientName::full_name).unwrap_or_else(|| "Unknown".to_string()),
            doctor_name: doctor.map(|d| d.name.clone()).unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Closed set of lifecycle states; anything else fails to deserialize.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Requested,
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Requested => write!(f, "Requested"),
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A (doctor, date, time) triple that hosts at most one live appointment.
/// Times are kept at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(doctor_id: i64, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            doctor_id,
            date,
            time: truncate_to_minute(time),
        }
    }
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Wire format for appointment times: `HH:MM` out, `HH:MM` or `HH:MM:SS` in.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| format!("Invalid time '{}', expected HH:MM", raw))
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQueryParams {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueQuery {
    pub doctor_id: Option<i64>,
}

/// Effective filter after role scoping has been applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    /// PostgREST query string, ordered by date then time.
    pub fn to_query(&self) -> String {
        let mut query_parts = Vec::new();

        if let Some(patient_id) = self.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(doctor_id) = self.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(date) = self.date {
            query_parts.push(format!("date=eq.{}", date.format("%Y-%m-%d")));
        }
        if let Some(status) = self.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        query_parts.push("order=date.asc,time.asc".to_string());

        query_parts.join("&")
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot not available")]
    SlotNotAvailable,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for AppointmentError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(_) => AppointmentError::SlotNotAvailable,
            DbError::ForeignKeyViolation(msg) => AppointmentError::ValidationError(msg),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::SlotNotAvailable => AppError::Conflict(err.to_string()),
            AppointmentError::InvalidStatusTransition(_) => AppError::BadRequest(err.to_string()),
            AppointmentError::InvalidTime(msg) | AppointmentError::ValidationError(msg) => {
                AppError::BadRequest(msg)
            }
            AppointmentError::Unauthorized => AppError::Forbidden(err.to_string()),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
