use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use shared_database::PostgrestClient;

use crate::models::{Appointment, AppointmentError, Slot};

/// First live appointment occupying `slot`, ignoring `exclude_appointment_id`.
pub fn find_conflict<'a>(
    appointments: &'a [Appointment],
    slot: &Slot,
    exclude_appointment_id: Option<i64>,
) -> Option<&'a Appointment> {
    appointments.iter().find(|appointment| {
        appointment.is_active()
            && Some(appointment.id) != exclude_appointment_id
            && appointment.slot() == *slot
    })
}

/// Next serial for a doctor's day given the highest one already issued.
pub fn next_serial_after(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

#[derive(Debug, Deserialize)]
struct SerialRow {
    serial_number: Option<i32>,
}

pub struct ConflictDetectionService<'a> {
    db: &'a PostgrestClient,
}

impl<'a> ConflictDetectionService<'a> {
    pub fn new(db: &'a PostgrestClient) -> Self {
        Self { db }
    }

    /// Fails with `SlotNotAvailable` when another live appointment holds the slot.
    /// The unique index on the table is the final word; this only gives an early answer.
    pub async fn check_slot(&self, slot: &Slot, exclude_appointment_id: Option<i64>) -> Result<(), AppointmentError> {
        debug!(
            "Checking slot for doctor {} on {} at {}",
            slot.doctor_id, slot.date, slot.time.format("%H:%M")
        );

        let path = format!(
            "/appointments?doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=neq.Cancelled",
            slot.doctor_id,
            slot.date.format("%Y-%m-%d"),
            slot.time.format("%H:%M:%S"),
        );
        let existing: Vec<Appointment> = self.db.request(Method::GET, &path, None).await?;

        if let Some(conflict) = find_conflict(&existing, slot, exclude_appointment_id) {
            warn!(
                "Slot conflict with appointment {} for doctor {}",
                conflict.id, slot.doctor_id
            );
            return Err(AppointmentError::SlotNotAvailable);
        }
        Ok(())
    }

    pub async fn next_serial_number(&self, doctor_id: i64, date: NaiveDate) -> Result<i32, AppointmentError> {
        let path = format!(
            "/appointments?select=serial_number&doctor_id=eq.{}&date=eq.{}&serial_number=not.is.null&order=serial_number.desc&limit=1",
            doctor_id,
            date.format("%Y-%m-%d"),
        );
        let rows: Vec<SerialRow> = self.db.request(Method::GET, &path, None).await?;
        let current_max = rows.first().and_then(|row| row.serial_number);

        Ok(next_serial_after(current_max))
    }
}
