// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use shared_models::auth::Role;

use crate::models::{AppointmentError, AppointmentStatus};

/// Appointment state machine. Pure; callers persist the result.
pub struct AppointmentLifecycleService;

/// The four things that can happen to an appointment after it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Confirm,
    Reschedule,
    Cancel,
    Complete,
}

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Status a fresh booking starts in. Front-desk bookings skip the request step.
    pub fn initial_status_for(&self, role: Role) -> AppointmentStatus {
        if role.is_staff() {
            AppointmentStatus::Scheduled
        } else {
            AppointmentStatus::Requested
        }
    }

    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition(current_status));
        }
        Ok(())
    }

    /// Requested -> Requested is a reschedule.
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Requested => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::Requested,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Resulting status of `action`, or `InvalidStatusTransition(current)`.
    pub fn apply(
        &self,
        current_status: AppointmentStatus,
        action: LifecycleAction,
    ) -> Result<AppointmentStatus, AppointmentError> {
        let target = Self::target_of(action);
        self.validate_status_transition(current_status, target)?;
        Ok(target)
    }

    /// Statuses from which `action` is allowed, used as the PATCH guard.
    pub fn source_statuses(&self, action: LifecycleAction) -> Vec<AppointmentStatus> {
        let target = Self::target_of(action);
        [
            AppointmentStatus::Requested,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ]
        .into_iter()
        .filter(|status| self.get_valid_transitions(*status).contains(&target))
        .filter(|status| action != LifecycleAction::Cancel || *status != AppointmentStatus::Cancelled)
        .collect()
    }

    fn target_of(action: LifecycleAction) -> AppointmentStatus {
        match action {
            LifecycleAction::Confirm => AppointmentStatus::Scheduled,
            LifecycleAction::Reschedule => AppointmentStatus::Requested,
            LifecycleAction::Cancel => AppointmentStatus::Cancelled,
            LifecycleAction::Complete => AppointmentStatus::Completed,
        }
    }

    /// Rejects a slot that starts before `now`. Later the same day is fine.
    pub fn validate_appointment_time(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        now: NaiveDateTime,
    ) -> Result<(), AppointmentError> {
        if date < now.date() {
            return Err(AppointmentError::InvalidTime(
                "Appointment date cannot be in the past".to_string(),
            ));
        }
        if date.and_time(time) < now {
            warn!("Rejected slot {} {} that already started", date, time.format("%H:%M"));
            return Err(AppointmentError::InvalidTime(
                "Appointment time cannot be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
