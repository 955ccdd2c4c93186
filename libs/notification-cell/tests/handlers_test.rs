use axum::extract::{Extension, Path, Query, State};
use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::handlers::{list_notifications, mark_notification_read};
use notification_cell::models::NotificationQuery;
use notification_cell::NotificationService;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockPostgrestResponses, TestConfig, TestUser};

#[tokio::test]
async fn doctor_reads_own_feed_by_profile_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("doctor_id", "eq.5"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestResponses::notification_row(2, 5, "New appointment: Asha Rao on 2030-01-10 at 09:00", false),
            MockPostgrestResponses::notification_row(1, 5, "New appointment: Ben Ode on 2030-01-09 at 10:00", true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let user = TestUser::doctor(5).to_user();

    let response = list_notifications(State(config), Extension(user), Query(NotificationQuery::default()))
        .await
        .unwrap();

    assert_eq!(response.0.as_array().unwrap().len(), 2);
    assert_eq!(response.0[0]["id"], 2);
}

#[tokio::test]
async fn doctor_cannot_read_another_doctors_feed() {
    let config = TestConfig::default().to_arc();
    let user = TestUser::doctor(5).to_user();

    let result = list_notifications(
        State(config),
        Extension(user),
        Query(NotificationQuery { doctor_id: Some(6) }),
    ).await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn staff_must_name_a_doctor() {
    let config = TestConfig::default().to_arc();
    let user = TestUser::receptionist().to_user();

    let result = list_notifications(State(config), Extension(user), Query(NotificationQuery::default())).await;

    match result {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Doctor ID is required"),
        other => panic!("expected BadRequest, got {:?}", other.map(|j| j.0)),
    }
}

#[tokio::test]
async fn mark_read_checks_ownership_then_patches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestResponses::notification_row(9, 5, "New appointment", false)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notifications"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestResponses::notification_row(9, 5, "New appointment", true)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();

    let other_doctor = TestUser::doctor(6).to_user();
    let denied = mark_notification_read(State(config.clone()), Extension(other_doctor), Path(9)).await;
    assert_matches!(denied, Err(AppError::Forbidden(_)));

    let owner = TestUser::doctor(5).to_user();
    let response = mark_notification_read(State(config), Extension(owner), Path(9)).await.unwrap();
    assert_eq!(response.0["is_read"], true);
}

#[tokio::test]
async fn notify_doctor_inserts_unread_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPostgrestResponses::notification_row(11, 5, "New appointment", false)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_app_config();
    let notification = NotificationService::new(&config)
        .notify_doctor(5, "New appointment")
        .await
        .unwrap();

    assert_eq!(notification.doctor_id, 5);
    assert!(!notification.is_read);
}
