use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::NotificationQuery;
use crate::services::NotificationService;

/// Doctors read their own feed; staff must name the doctor.
fn resolve_doctor_scope(user: &User, requested: Option<i64>) -> Result<i64, AppError> {
    match user.role {
        Role::Doctor => {
            let own = user.doctor_id
                .ok_or_else(|| AppError::Forbidden("Doctor profile not linked to this account".to_string()))?;
            match requested {
                Some(other) if other != own => Err(AppError::Forbidden(
                    "Doctors can only read their own notifications".to_string(),
                )),
                _ => Ok(own),
            }
        }
        Role::Admin | Role::Receptionist => requested
            .ok_or_else(|| AppError::BadRequest("Doctor ID is required".to_string())),
        Role::Patient => Err(AppError::Forbidden("Patients have no notification feed".to_string())),
    }
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = resolve_doctor_scope(&user, query.doctor_id)?;

    let notifications = NotificationService::new(&config)
        .list_for_doctor(doctor_id)
        .await?;

    Ok(Json(json!(notifications)))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = NotificationService::new(&config);

    let notification = service.get_notification(notification_id).await?;
    if !user.is_staff() && !user.is_doctor(notification.doctor_id) {
        return Err(AppError::Forbidden("Not authorized to update this notification".to_string()));
    }

    let updated = service.mark_read(notification_id).await?;
    Ok(Json(json!(updated)))
}
