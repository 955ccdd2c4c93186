use serde::{Deserialize, Serialize};

use shared_database::DbError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub total_records: u64,
    pub appointments_today: u64,
}

/// One day of the appointment trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendPoint {
    /// Short weekday name, e.g. "Mon".
    pub name: String,
    pub date: String,
    pub appointments: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub doctor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for AnalyticsError {
    fn from(err: DbError) -> Self {
        AnalyticsError::DatabaseError(err.to_string())
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
