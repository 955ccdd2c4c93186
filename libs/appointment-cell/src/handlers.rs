// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_staff;

use crate::models::{
    Appointment, AppointmentFilter, AppointmentQueryParams, BookAppointmentRequest,
    QueueQuery, RescheduleAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn today() -> NaiveDate {
    now().date()
}

// ==============================================================================
// ACCESS RULES
// ==============================================================================

/// Narrow the requested filters to what the caller may see.
pub fn scope_filter(user: &User, params: AppointmentQueryParams) -> Result<AppointmentFilter, AppError> {
    let mut filter = AppointmentFilter {
        patient_id: params.patient_id,
        doctor_id: params.doctor_id,
        date: params.date,
        status: params.status,
    };

    match user.role {
        Role::Admin | Role::Receptionist => {}
        Role::Patient => {
            let own = linked_patient(user)?;
            if matches!(params.patient_id, Some(other) if other != own) {
                return Err(AppError::Forbidden("Patients can only view their own appointments".to_string()));
            }
            filter.patient_id = Some(own);
        }
        Role::Doctor => {
            let own = linked_doctor(user)?;
            if matches!(params.doctor_id, Some(other) if other != own) {
                return Err(AppError::Forbidden("Doctors can only view their own appointments".to_string()));
            }
            filter.doctor_id = Some(own);
        }
    }

    Ok(filter)
}

fn linked_patient(user: &User) -> Result<i64, AppError> {
    user.patient_id
        .ok_or_else(|| AppError::Forbidden("Patient profile not linked to this account".to_string()))
}

fn linked_doctor(user: &User) -> Result<i64, AppError> {
    user.doctor_id
        .ok_or_else(|| AppError::Forbidden("Doctor profile not linked to this account".to_string()))
}

fn can_view(user: &User, appointment: &Appointment) -> bool {
    user.is_staff() || user.owns_patient(appointment.patient_id) || user.is_doctor(appointment.doctor_id)
}

fn ensure_can_view(user: &User, appointment: &Appointment) -> Result<(), AppError> {
    if can_view(user, appointment) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not authorized to view this appointment".to_string()))
    }
}

// ==============================================================================
// BOOKING AND READS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    match user.role {
        Role::Patient if !user.owns_patient(request.patient_id) => {
            return Err(AppError::Forbidden("Patients can only book for themselves".to_string()));
        }
        Role::Doctor if !user.is_doctor(request.doctor_id) => {
            return Err(AppError::Forbidden("Doctors can only book into their own schedule".to_string()));
        }
        _ => {}
    }

    let appointment = AppointmentBookingService::new(&config)
        .book_appointment(request, user.role, now())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Value>, AppError> {
    let filter = scope_filter(&user, params)?;

    let appointments = AppointmentBookingService::new(&config)
        .list_appointments(&filter)
        .await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_doctor_queue(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = match user.role {
        Role::Doctor => {
            let own = linked_doctor(&user)?;
            if matches!(query.doctor_id, Some(other) if other != own) {
                return Err(AppError::Forbidden("Doctors can only view their own queue".to_string()));
            }
            own
        }
        Role::Admin | Role::Receptionist => query.doctor_id
            .ok_or_else(|| AppError::BadRequest("Doctor ID is required".to_string()))?,
        Role::Patient => {
            return Err(AppError::Forbidden("Patients cannot view doctor queues".to_string()));
        }
    };

    let queue = AppointmentBookingService::new(&config)
        .doctor_queue(doctor_id, today())
        .await?;

    Ok(Json(json!(queue)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentBookingService::new(&config)
        .get_appointment(appointment_id)
        .await?;

    ensure_can_view(&user, &appointment.appointment)?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// LIFECYCLE TRANSITIONS
// ==============================================================================

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;

    let service = AppointmentBookingService::new(&config);
    let current = service.get_appointment(appointment_id).await?;
    let confirmed = service.confirm_appointment(&current.appointment).await?;

    Ok(Json(json!(confirmed)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);
    let current = service.get_appointment(appointment_id).await?.appointment;

    if !user.is_staff() && !user.owns_patient(current.patient_id) {
        return Err(AppError::Forbidden("Not authorized to reschedule this appointment".to_string()));
    }

    let rescheduled = service.reschedule_appointment(&current, request, now()).await?;
    Ok(Json(json!(rescheduled)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);
    let current = service.get_appointment(appointment_id).await?.appointment;

    if !can_view(&user, &current) {
        return Err(AppError::Forbidden("Not authorized to cancel this appointment".to_string()));
    }

    let cancelled = service.cancel_appointment(&current).await?;
    Ok(Json(json!(cancelled)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);
    let current = service.get_appointment(appointment_id).await?.appointment;

    if !user.is_staff() && !user.is_doctor(current.doctor_id) {
        return Err(AppError::Forbidden("Only the assigned doctor can complete this appointment".to_string()));
    }

    let completed = service.complete_appointment(&current).await?;
    Ok(Json(json!(completed)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;

    AppointmentBookingService::new(&config)
        .delete_appointment(appointment_id)
        .await?;

    Ok(Json(json!({ "message": "Appointment deleted" })))
}
