use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{optional_user, require_admin};

use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::AccountService;

// ==============================================================================
// PUBLIC
// ==============================================================================

/// Open to anyone for Patient accounts. A bearer token, when present, is
/// checked so that an Admin can create other roles through the same route.
#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let caller = optional_user(&headers, &config)?;

    let profile = AccountService::new(&config)
        .register(request, caller.as_ref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": profile })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Login attempt");

    let response = AccountService::new(&config).login(request).await?;
    Ok(Json(json!(response)))
}

// ==============================================================================
// AUTHENTICATED
// ==============================================================================

#[axum::debug_handler]
pub async fn get_current_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let profile = AccountService::new(&config).current_profile(user.id).await?;
    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = AccountService::new(&config)
        .update_profile(user.id, request)
        .await?;
    Ok(Json(json!(profile)))
}

// ==============================================================================
// ADMIN: USER MANAGEMENT
// ==============================================================================

#[axum::debug_handler]
pub async fn list_users(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let users = AccountService::new(&config).list_users().await?;
    Ok(Json(json!(users)))
}

#[axum::debug_handler]
pub async fn create_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;

    let profile = AccountService::new(&config)
        .register(request, Some(&user))
        .await?;
    Ok((StatusCode::CREATED, Json(json!(profile))))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    AccountService::new(&config).delete_user(&user, user_id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}
