use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::{CreateMedicalRecordRequest, MedicalRecord, MedicalRecordQuery, UpdateMedicalRecordRequest};
use crate::services::MedicalRecordService;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Patients only ever see their own history; everyone else may filter freely.
pub fn scope_patient(user: &User, requested: Option<i64>) -> Result<Option<i64>, AppError> {
    if user.role != Role::Patient {
        return Ok(requested);
    }

    let own = user.patient_id.ok_or_else(|| AppError::Forbidden("No patient profile linked".to_string()))?;
    match requested {
        Some(patient_id) if patient_id != own => {
            Err(AppError::Forbidden("Not authorized to view these records".to_string()))
        }
        _ => Ok(Some(own)),
    }
}

/// Resolves the doctor a new record is filed under.
pub fn author_for(user: &User, requested: Option<i64>) -> Result<i64, AppError> {
    match user.role {
        Role::Doctor => {
            let own = user.doctor_id.ok_or_else(|| AppError::Forbidden("No doctor profile linked".to_string()))?;
            match requested {
                Some(doctor_id) if doctor_id != own => {
                    Err(AppError::Forbidden("Doctors can only write their own records".to_string()))
                }
                _ => Ok(own),
            }
        }
        Role::Admin | Role::Receptionist => {
            requested.ok_or_else(|| AppError::BadRequest("Doctor ID is required".to_string()))
        }
        Role::Patient => Err(AppError::Forbidden("Patients cannot write medical records".to_string())),
    }
}

fn can_edit(user: &User, record: &MedicalRecord) -> bool {
    user.is_staff() || user.is_doctor(record.doctor_id)
}

#[axum::debug_handler]
pub async fn list_records(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<MedicalRecordQuery>,
) -> Result<Json<Value>, AppError> {
    let patient_id = scope_patient(&user, query.patient_id)?;

    let records = MedicalRecordService::new(&config).list_records(patient_id, today()).await?;
    Ok(Json(json!(records)))
}

#[axum::debug_handler]
pub async fn get_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let record = MedicalRecordService::new(&config).get_record(record_id, today()).await?;

    if user.role == Role::Patient && !user.owns_patient(record.patient_id) {
        return Err(AppError::Forbidden("Not authorized to view this record".to_string()));
    }

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn create_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor_id = author_for(&user, request.doctor_id)?;

    let record = MedicalRecordService::new(&config)
        .create_record(doctor_id, request, today())
        .await?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Medical record added successfully",
        "record": record
    }))))
}

#[axum::debug_handler]
pub async fn update_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<i64>,
    Json(request): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);
    let current = service.get_record(record_id, today()).await?;
    if !can_edit(&user, &current) {
        return Err(AppError::Forbidden("Not authorized to edit this record".to_string()));
    }

    let record = service.update_record(record_id, request, today()).await?;
    Ok(Json(json!({
        "message": "Medical record updated successfully",
        "record": record
    })))
}

#[axum::debug_handler]
pub async fn delete_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);
    let current = service.get_record(record_id, today()).await?;
    if !can_edit(&user, &current) {
        return Err(AppError::Forbidden("Not authorized to delete this record".to_string()));
    }

    service.delete_record(record_id).await?;
    Ok(Json(json!({ "message": "Medical record deleted successfully" })))
}
