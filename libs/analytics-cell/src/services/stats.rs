use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use futures::future::try_join_all;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{AnalyticsError, DashboardStats, TrendPoint};

/// Days shown on the trend chart, today included.
pub const TREND_DAYS: i64 = 7;

pub struct AnalyticsService {
    db: PostgrestClient,
}

impl AnalyticsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Dashboard counters, hospital-wide or for one doctor.
    pub async fn stats(&self, doctor_id: Option<i64>, today: NaiveDate) -> Result<DashboardStats, AnalyticsError> {
        debug!("Computing stats for doctor {:?} on {}", doctor_id, today);

        let (total_patients, total_doctors, total_records, appointments_today) = match doctor_id {
            Some(doctor_id) => {
                let patients_path = format!("/doctor_patients?select=patient_id&doctor_id=eq.{}", doctor_id);
                let records_path = format!("/medical_records?select=id&doctor_id=eq.{}", doctor_id);
                let appointments_path = format!("/appointments?select=id&doctor_id=eq.{}&date=eq.{}", doctor_id, today);
                futures::try_join!(
                    self.db.count(&patients_path),
                    self.db.count("/doctors?select=id"),
                    self.db.count(&records_path),
                    self.db.count(&appointments_path),
                )?
            }
            None => {
                let appointments_path = format!("/appointments?select=id&date=eq.{}", today);
                futures::try_join!(
                    self.db.count("/patients?select=id"),
                    self.db.count("/doctors?select=id"),
                    self.db.count("/medical_records?select=id"),
                    self.db.count(&appointments_path),
                )?
            }
        };

        Ok(DashboardStats {
            total_patients,
            total_doctors,
            total_records,
            appointments_today,
        })
    }

    /// Appointments per day for the last week, oldest first. One exact
    /// count per day, so the server's row cap never truncates a bucket.
    pub async fn trends(&self, today: NaiveDate) -> Result<Vec<TrendPoint>, AnalyticsError> {
        let days = trend_window(today);
        let counts = try_join_all(days.iter().map(|day| {
            let path = format!("/appointments?select=id&date=eq.{}", day.format("%Y-%m-%d"));
            async move { self.db.count(&path).await }
        }))
        .await?;

        Ok(build_trend(days.into_iter().zip(counts), today))
    }
}

/// The `TREND_DAYS` dates ending at `today`, oldest first.
pub fn trend_window(today: NaiveDate) -> Vec<NaiveDate> {
    let start = today - Duration::days(TREND_DAYS - 1);
    (0..TREND_DAYS).map(|offset| start + Duration::days(offset)).collect()
}

/// Places per-day counts into the trailing window ending at `today`,
/// filling days without appointments with zero.
pub fn build_trend(counts: impl IntoIterator<Item = (NaiveDate, u64)>, today: NaiveDate) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, u64> = trend_window(today)
        .into_iter()
        .map(|date| (date, 0))
        .collect();

    for (date, appointments) in counts {
        if let Some(count) = buckets.get_mut(&date) {
            *count += appointments;
        }
    }

    buckets
        .into_iter()
        .map(|(date, appointments)| TrendPoint {
            name: date.format("%a").to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            appointments,
        })
        .collect()
}
