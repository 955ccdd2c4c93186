use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::StatsQuery;
use crate::services::AnalyticsService;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Doctors always see their own numbers; staff pick a doctor or the whole hospital.
pub fn stats_scope(user: &User, requested: Option<i64>) -> Result<Option<i64>, AppError> {
    match user.role {
        Role::Admin | Role::Receptionist => Ok(requested),
        Role::Doctor => {
            let own = user.doctor_id.ok_or_else(|| AppError::Forbidden("No doctor profile linked".to_string()))?;
            match requested {
                Some(doctor_id) if doctor_id != own => {
                    Err(AppError::Forbidden("Not authorized to view another doctor's stats".to_string()))
                }
                _ => Ok(Some(own)),
            }
        }
        Role::Patient => Err(AppError::Forbidden("Patients cannot view analytics".to_string())),
    }
}

#[axum::debug_handler]
pub async fn get_stats(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = stats_scope(&user, query.doctor_id)?;

    let stats = AnalyticsService::new(&config).stats(doctor_id, today()).await?;
    Ok(Json(json!(stats)))
}

#[axum::debug_handler]
pub async fn get_trends(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role == Role::Patient {
        return Err(AppError::Forbidden("Patients cannot view analytics".to_string()));
    }

    let trend = AnalyticsService::new(&config).trends(today()).await?;
    Ok(Json(json!(trend)))
}
