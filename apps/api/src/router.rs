use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use analytics_cell::analytics_routes;
use appointment_cell::appointment_routes;
use auth_cell::{auth_routes, user_routes};
use doctor_cell::doctor_routes;
use medical_record_cell::medical_record_routes;
use notification_cell::notification_routes;
use patient_cell::patient_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/medical_records", medical_record_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/analytics", analytics_routes(state));

    Router::new()
        .route("/", get(|| async { "Hospital Management API is running" }))
        .nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

    #[tokio::test]
    async fn liveness_is_public() {
        let app = create_router(TestConfig::default().to_arc());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = create_router(TestConfig::default().to_arc());

        for uri in ["/api/appointments", "/api/patients", "/api/medical_records", "/api/analytics/stats"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn expired_token_is_rejected_with_json_error() {
        let config = TestConfig::default();
        let token = JwtTestUtils::create_expired_token(&TestUser::admin(), &config.jwt_secret);
        let app = create_router(config.to_arc());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/doctors")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn patient_token_is_refused_analytics() {
        let config = TestConfig::default();
        let token = JwtTestUtils::create_test_token(&TestUser::patient(3), &config.jwt_secret, None);
        let app = create_router(config.to_arc());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/analytics/trends")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
