// libs/appointment-cell/src/services/booking.rs
use std::future::Future;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use notification_cell::NotificationService;
use shared_config::AppConfig;
use shared_database::{DbError, PostgrestClient};
use shared_models::auth::Role;

use crate::models::{
    Appointment, AppointmentDetails, AppointmentError, AppointmentFilter, AppointmentRow,
    AppointmentStatus, BookAppointmentRequest, DoctorName, PatientName,
    RescheduleAppointmentRequest, Slot, APPOINTMENT_SELECT,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::{AppointmentLifecycleService, LifecycleAction};

/// Attempts at claiming a serial number before giving up.
pub const MAX_SERIAL_ATTEMPTS: usize = 3;

/// A unique violation on the per-day serial index, as opposed to the slot index.
fn is_serial_collision(message: &str) -> bool {
    message.contains("serial")
}

pub struct AppointmentBookingService {
    db: PostgrestClient,
    lifecycle: AppointmentLifecycleService,
    notifications: NotificationService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            lifecycle: AppointmentLifecycleService::new(),
            notifications: NotificationService::new(config),
        }
    }

    fn conflicts(&self) -> ConflictDetectionService<'_> {
        ConflictDetectionService::new(&self.db)
    }

    /// Create an appointment on a free slot. `role` decides whether it starts
    /// as a request or goes straight onto the schedule with a serial number.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        role: Role,
        now: NaiveDateTime,
    ) -> Result<AppointmentDetails, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {} on {}",
            request.patient_id, request.doctor_id, request.date
        );

        self.lifecycle.validate_appointment_time(request.date, request.time, now)?;

        let patient = self.fetch_patient(request.patient_id).await?;
        let doctor = self.fetch_doctor(request.doctor_id).await?;

        let slot = Slot::new(request.doctor_id, request.date, request.time);
        self.conflicts().check_slot(&slot, None).await?;

        let status = self.lifecycle.initial_status_for(role);
        let row = |serial_number: Option<i32>| json!({
            "patient_id": request.patient_id,
            "doctor_id": slot.doctor_id,
            "date": slot.date.format("%Y-%m-%d").to_string(),
            "time": slot.time.format("%H:%M:%S").to_string(),
            "reason": request.reason,
            "status": status,
            "serial_number": serial_number,
        });

        let appointment: Appointment = if status == AppointmentStatus::Scheduled {
            self.with_next_serial(slot.doctor_id, slot.date, |serial| {
                self.db.insert("appointments", row(Some(serial)))
            }).await?
        } else {
            self.db.insert("appointments", row(None)).await?
        };

        info!("Appointment {} booked as {}", appointment.id, appointment.status);

        let message = format!(
            "New appointment: {} on {} at {}",
            patient.full_name(),
            appointment.date.format("%Y-%m-%d"),
            appointment.time.format("%H:%M"),
        );
        if let Err(e) = self.notifications.notify_doctor(appointment.doctor_id, &message).await {
            warn!("Failed to notify doctor {} of appointment {}: {}", appointment.doctor_id, appointment.id, e);
        }

        Ok(AppointmentDetails::new(appointment, Some(&patient), Some(&doctor)))
    }

    pub async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentDetails>, AppointmentError> {
        debug!("Listing appointments with filter {:?}", filter);

        let path = format!("/appointments?select={}&{}", APPOINTMENT_SELECT, filter.to_query());
        let rows: Vec<AppointmentRow> = self.db.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(AppointmentRow::into_details).collect())
    }

    /// A doctor's live appointments for `today`, in serial order.
    pub async fn doctor_queue(&self, doctor_id: i64, today: NaiveDate) -> Result<Vec<AppointmentDetails>, AppointmentError> {
        let path = format!(
            "/appointments?select={}&doctor_id=eq.{}&date=eq.{}&status=neq.Cancelled&order=serial_number.asc.nullslast,time.asc",
            APPOINTMENT_SELECT,
            doctor_id,
            today.format("%Y-%m-%d"),
        );
        let rows: Vec<AppointmentRow> = self.db.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(AppointmentRow::into_details).collect())
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<AppointmentDetails, AppointmentError> {
        let path = format!("/appointments?id=eq.{}&select={}", appointment_id, APPOINTMENT_SELECT);
        let mut rows: Vec<AppointmentRow> = self.db.request(Method::GET, &path, None).await?;

        rows.pop()
            .map(AppointmentRow::into_details)
            .ok_or(AppointmentError::NotFound)
    }

    /// Requested -> Scheduled with the next free serial for the doctor's day.
    pub async fn confirm_appointment(&self, current: &Appointment) -> Result<AppointmentDetails, AppointmentError> {
        let new_status = self.lifecycle.apply(current.status, LifecycleAction::Confirm)?;
        let path = self.guarded_path(current.id, LifecycleAction::Confirm);

        let mut rows: Vec<AppointmentRow> = self.with_next_serial(current.doctor_id, current.date, |serial| {
            self.db.update(&path, json!({
                "status": new_status,
                "serial_number": serial,
                "updated_at": Utc::now().to_rfc3339(),
            }))
        }).await?;

        if rows.is_empty() {
            return Err(self.stale_transition(current.id).await);
        }
        let confirmed = rows.swap_remove(0).into_details();
        info!("Appointment {} confirmed with serial {:?}", current.id, confirmed.appointment.serial_number);
        Ok(confirmed)
    }

    /// Move a pending request to another slot. It stays Requested.
    pub async fn reschedule_appointment(
        &self,
        current: &Appointment,
        request: RescheduleAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<AppointmentDetails, AppointmentError> {
        let new_status = self.lifecycle.apply(current.status, LifecycleAction::Reschedule)?;
        self.lifecycle.validate_appointment_time(request.date, request.time, now)?;

        let slot = Slot::new(current.doctor_id, request.date, request.time);
        self.conflicts().check_slot(&slot, Some(current.id)).await?;

        let path = self.guarded_path(current.id, LifecycleAction::Reschedule);
        let mut rows: Vec<AppointmentRow> = self.db.update(&path, json!({
            "date": slot.date.format("%Y-%m-%d").to_string(),
            "time": slot.time.format("%H:%M:%S").to_string(),
            "status": new_status,
            "updated_at": Utc::now().to_rfc3339(),
        })).await?;

        if rows.is_empty() {
            return Err(self.stale_transition(current.id).await);
        }
        info!("Appointment {} rescheduled to {} {}", current.id, slot.date, slot.time.format("%H:%M"));
        Ok(rows.swap_remove(0).into_details())
    }

    pub async fn cancel_appointment(&self, current: &Appointment) -> Result<AppointmentDetails, AppointmentError> {
        self.transition(current, LifecycleAction::Cancel).await
    }

    pub async fn complete_appointment(&self, current: &Appointment) -> Result<AppointmentDetails, AppointmentError> {
        self.transition(current, LifecycleAction::Complete).await
    }

    pub async fn delete_appointment(&self, appointment_id: i64) -> Result<(), AppointmentError> {
        let removed = self.db.delete(&format!("/appointments?id=eq.{}", appointment_id)).await?;
        if removed == 0 {
            return Err(AppointmentError::NotFound);
        }
        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    async fn transition(&self, current: &Appointment, action: LifecycleAction) -> Result<AppointmentDetails, AppointmentError> {
        let new_status = self.lifecycle.apply(current.status, action)?;
        let path = self.guarded_path(current.id, action);

        let mut rows: Vec<AppointmentRow> = self.db.update(&path, json!({
            "status": new_status,
            "updated_at": Utc::now().to_rfc3339(),
        })).await?;

        if rows.is_empty() {
            return Err(self.stale_transition(current.id).await);
        }
        info!("Appointment {} moved {} -> {}", current.id, current.status, new_status);
        Ok(rows.swap_remove(0).into_details())
    }

    /// Update path that only matches while the row is still in a source status
    /// for `action`, so a concurrent transition makes this one a no-op.
    /// Returned rows carry the embedded names.
    fn guarded_path(&self, appointment_id: i64, action: LifecycleAction) -> String {
        let sources: Vec<String> = self.lifecycle
            .source_statuses(action)
            .iter()
            .map(AppointmentStatus::to_string)
            .collect();

        format!(
            "/appointments?id=eq.{}&status=in.({})&select={}",
            appointment_id,
            sources.join(","),
            APPOINTMENT_SELECT,
        )
    }

    /// Error for a guarded update that matched nothing: report the status the
    /// row moved to, or NotFound if it is gone.
    async fn stale_transition(&self, appointment_id: i64) -> AppointmentError {
        match self.get_appointment(appointment_id).await {
            Ok(fresh) => {
                let status = fresh.appointment.status;
                warn!("Appointment {} changed concurrently, now {}", appointment_id, status);
                AppointmentError::InvalidStatusTransition(status)
            }
            Err(e) => e,
        }
    }

    /// Run `write` with the next serial for (doctor, date), retrying when a
    /// concurrent writer claimed the same number first.
    async fn with_next_serial<T, F, Fut>(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        mut write: F,
    ) -> Result<T, AppointmentError>
    where
        F: FnMut(i32) -> Fut,
        Fut: Future<Output = Result<T, DbError>>,
    {
        for attempt in 1..=MAX_SERIAL_ATTEMPTS {
            let serial = self.conflicts().next_serial_number(doctor_id, date).await?;

            match write(serial).await {
                Ok(value) => return Ok(value),
                Err(DbError::UniqueViolation(msg)) if is_serial_collision(&msg) => {
                    warn!(
                        "Serial {} for doctor {} on {} already taken (attempt {}/{})",
                        serial, doctor_id, date, attempt, MAX_SERIAL_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppointmentError::DatabaseError(format!(
            "Could not assign a serial number after {} attempts",
            MAX_SERIAL_ATTEMPTS
        )))
    }

    async fn fetch_patient(&self, patient_id: i64) -> Result<PatientName, AppointmentError> {
        let path = format!("/patients?id=eq.{}&select=first_name,last_name", patient_id);
        let mut rows: Vec<PatientName> = self.db.request(Method::GET, &path, None).await?;

        rows.pop().ok_or(AppointmentError::PatientNotFound)
    }

    async fn fetch_doctor(&self, doctor_id: i64) -> Result<DoctorName, AppointmentError> {
        let path = format!("/doctors?id=eq.{}&select=name", doctor_id);
        let mut rows: Vec<DoctorName> = self.db.request(Method::GET, &path, None).await?;

        rows.pop().ok_or(AppointmentError::DoctorNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_collisions_are_told_apart_from_slot_collisions() {
        assert!(is_serial_collision(
            "Key (doctor_id, date, serial_number)=(5, 2030-01-10, 1) already exists."
        ));
        assert!(!is_serial_collision(
            "Key (doctor_id, date, \"time\")=(5, 2030-01-10, 09:00:00) already exists."
        ));
    }
}
