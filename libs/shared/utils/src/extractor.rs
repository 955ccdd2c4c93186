use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    match auth_value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AppError::Auth("Invalid authorization header format".to_string())),
    }
}

/// Resolve the caller from headers, if a valid bearer token is present.
pub fn optional_user(headers: &HeaderMap, config: &AppConfig) -> Result<Option<User>, AppError> {
    if !headers.contains_key("Authorization") {
        return Ok(None);
    }
    let token = extract_bearer_token(headers)?;
    validate_token(&token, &config.jwt_secret)
        .map(Some)
        .map_err(AppError::Auth)
}

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;

    let user = validate_token(&token, &config.jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub fn require_staff(user: &User) -> Result<(), AppError> {
    if user.is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only Admins or Receptionists can perform this action".to_string()))
    }
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only Admins can perform this action".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::{HeaderValue, StatusCode}, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn app(config: Arc<AppConfig>) -> Router {
        Router::new()
            .route("/whoami", get(|Extension(user): Extension<User>| async move { user.id.to_string() }))
            .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
            .with_state(config)
    }

    fn request_with(header: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Token abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc");
    }

    #[tokio::test]
    async fn valid_token_passes_through() {
        let config = TestConfig::default().to_arc();
        let token = JwtTestUtils::create_test_token(&TestUser::receptionist(), &config.jwt_secret, Some(1));

        let response = app(config)
            .oneshot(request_with(Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_expired_token_is_401() {
        let config = TestConfig::default().to_arc();

        let response = app(config.clone()).oneshot(request_with(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let expired = JwtTestUtils::create_expired_token(&TestUser::patient(3), &config.jwt_secret);
        let response = app(config)
            .oneshot(request_with(Some(format!("Bearer {}", expired))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn staff_guard_rejects_clinical_roles() {
        assert!(require_staff(&TestUser::receptionist().to_user()).is_ok());
        assert!(require_staff(&TestUser::doctor(5).to_user()).is_err());
        assert!(require_admin(&TestUser::receptionist().to_user()).is_err());
        assert!(require_admin(&TestUser::admin().to_user()).is_ok());
    }
}
