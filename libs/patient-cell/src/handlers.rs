use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_staff;

use crate::models::{CreatePatientRequest, PatientListQuery, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_staff(&user)?;

    let patient = PatientService::new(&config).create_patient(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Patient added successfully", "patient": patient })),
    ))
}

/// Doctors only ever see their own panel.
#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(mut query): Query<PatientListQuery>,
) -> Result<Json<Value>, AppError> {
    match user.role {
        Role::Admin | Role::Receptionist => {}
        Role::Doctor => {
            let own = user.doctor_id
                .ok_or_else(|| AppError::Forbidden("Doctor profile not linked to this account".to_string()))?;
            if matches!(query.doctor_id, Some(other) if other != own) {
                return Err(AppError::Forbidden("Doctors can only list their own patients".to_string()));
            }
            query.doctor_id = Some(own);
        }
        Role::Patient => {
            return Err(AppError::Forbidden("Patients cannot list patient records".to_string()));
        }
    }

    let patients = PatientService::new(&config).list_patients(&query).await?;
    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if user.role == Role::Patient && !user.owns_patient(patient_id) {
        return Err(AppError::Forbidden("Patients can only view their own record".to_string()));
    }

    let patient = PatientService::new(&config).get_patient(patient_id).await?;
    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() && !user.owns_patient(patient_id) {
        return Err(AppError::Forbidden("Not authorized to update this patient".to_string()));
    }

    let patient = PatientService::new(&config)
        .update_patient(patient_id, request)
        .await?;

    Ok(Json(json!({ "message": "Patient updated successfully", "patient": patient })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden(
            "Unauthorized: Only Admins or Receptionists can delete patients".to_string(),
        ));
    }

    PatientService::new(&config).delete_patient(patient_id).await?;
    Ok(Json(json!({ "message": "Patient deleted successfully" })))
}
