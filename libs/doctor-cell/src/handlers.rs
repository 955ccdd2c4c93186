use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{require_admin, require_staff};

use crate::models::{CreateDoctorRequest, DoctorSearchFilters, UpdateDoctorRequest};
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Query(filters): Query<DoctorSearchFilters>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&config).list_doctors(&filters).await?;
    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&config).get_doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_staff(&user)?;

    let doctor = DoctorService::new(&config).create_doctor(request).await?;
    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() && !user.is_doctor(doctor_id) {
        return Err(AppError::Forbidden("Not authorized to update this doctor".to_string()));
    }

    let doctor = DoctorService::new(&config).update_doctor(doctor_id, request).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    DoctorService::new(&config).delete_doctor(doctor_id).await?;
    Ok(Json(json!({ "message": "Doctor deleted" })))
}
