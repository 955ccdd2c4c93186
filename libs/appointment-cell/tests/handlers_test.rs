use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::*;
use appointment_cell::models::*;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockPostgrestResponses, TestConfig, TestUser};

const DAY: &str = "2030-01-10";

fn booking(patient_id: i64, doctor_id: i64) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id,
        doctor_id,
        date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        reason: Some("Fever".to_string()),
    }
}

async fn mount_patient_and_doctor(server: &MockServer, patient_id: i64, doctor_id: i64) {
    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestResponses::patient_row(patient_id, "Asha", "Rao")
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestResponses::doctor_row(doctor_id, "Dr. Mehta", "Cardiology")
        ])))
        .mount(server)
        .await;
}

async fn mount_slot_check(server: &MockServer, doctor_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("time", "eq.09:00:00"))
        .and(query_param("status", "neq.Cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_appointment(server: &MockServer, row: serde_json::Value) {
    let id = row["id"].as_i64().unwrap();
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(server)
        .await;
}

fn row(id: i64, status: &str, serial: Option<i32>) -> serde_json::Value {
    MockPostgrestResponses::appointment_row(id, 3, 5, DAY, "09:00:00", status, serial)
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[tokio::test]
async fn patient_booking_is_requested_and_notifies_doctor() {
    let server = MockServer::start().await;
    mount_patient_and_doctor(&server, 3, 5).await;
    mount_slot_check(&server, 5, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(1, "Requested", None)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPostgrestResponses::notification_row(1, 5, "New appointment: Asha Rao on 2030-01-10 at 09:00", false)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let user = TestUser::patient(3).to_user();

    let (status, Json(body)) = book_appointment(State(config), Extension(user), Json(booking(3, 5)))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Requested");
    assert_eq!(body["time"], "09:00");
    assert!(body["serial_number"].is_null());
    assert_eq!(body["patient_name"], "Asha Rao");
    assert_eq!(body["doctor_name"], "Dr. Mehta");
}

#[tokio::test]
async fn notification_failure_does_not_fail_booking() {
    let server = MockServer::start().await;
    mount_patient_and_doctor(&server, 3, 5).await;
    mount_slot_check(&server, 5, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(1, "Requested", None)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(booking(3, 5))).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn staff_booking_is_scheduled_with_next_serial() {
    let server = MockServer::start().await;
    mount_patient_and_doctor(&server, 3, 5).await;
    mount_slot_check(&server, 5, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("select", "serial_number"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "serial_number": 2 }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(4, "Scheduled", Some(3))])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPostgrestResponses::notification_row(1, 5, "New appointment", false)
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let (_, Json(body)) = book_appointment(State(config), Extension(TestUser::receptionist().to_user()), Json(booking(3, 5)))
        .await
        .unwrap();

    assert_eq!(body["status"], "Scheduled");
    assert_eq!(body["serial_number"], 3);
}

#[tokio::test]
async fn occupied_slot_is_rejected_without_insert() {
    let server = MockServer::start().await;
    mount_patient_and_doctor(&server, 3, 5).await;
    mount_slot_check(&server, 5, json!([row(1, "Scheduled", Some(1))])).await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(booking(3, 5))).await;

    match result {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Slot not available"),
        other => panic!("expected Conflict, got {:?}", other.map(|(s, _)| s)),
    }
}

#[tokio::test]
async fn concurrent_booking_loser_gets_conflict() {
    let server = MockServer::start().await;
    mount_patient_and_doctor(&server, 3, 5).await;
    mount_slot_check(&server, 5, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_active_slot\"",
            "details": "Key (doctor_id, date, \"time\")=(5, 2030-01-10, 09:00:00) already exists.",
            "hint": null
        })))
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(booking(3, 5))).await;

    assert_matches!(result, Err(AppError::Conflict(ref msg)) if msg == "Slot not available");
}

#[tokio::test]
async fn unknown_doctor_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestResponses::patient_row(3, "Asha", "Rao")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(booking(3, 99))).await;

    assert_matches!(result, Err(AppError::NotFound(ref msg)) if msg == "Doctor not found");
}

#[tokio::test]
async fn patient_cannot_book_for_another_patient() {
    let config = TestConfig::default().to_arc();
    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(booking(4, 5))).await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn past_dates_are_rejected() {
    let config = TestConfig::default().to_arc();
    let mut request = booking(3, 5);
    request.date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();

    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(request)).await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn earlier_today_is_rejected() {
    let config = TestConfig::default().to_arc();
    let mut request = booking(3, 5);
    request.date = Utc::now().date_naive();
    request.time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();

    let result = book_appointment(State(config), Extension(TestUser::patient(3).to_user()), Json(request)).await;

    assert_matches!(result, Err(AppError::BadRequest(ref msg)) if msg.contains("past"));
}

// ==============================================================================
// READS
// ==============================================================================

#[tokio::test]
async fn appointment_reads_carry_patient_and_doctor_names() {
    let server = MockServer::start().await;
    let mut named = row(1, "Scheduled", Some(1));
    named["patients"] = json!({ "first_name": "Asha", "last_name": "Rao" });
    named["doctors"] = json!({ "name": "Dr. Mehta" });

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.1"))
        .and(query_param("select", APPOINTMENT_SELECT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([named])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let Json(body) = get_appointment(State(config), Extension(TestUser::patient(3).to_user()), Path(1))
        .await
        .unwrap();

    assert_eq!(body["patient_name"], "Asha Rao");
    assert_eq!(body["doctor_name"], "Dr. Mehta");
    assert_eq!(body["time"], "09:00");
    assert!(body.get("patients").is_none());
}

#[tokio::test]
async fn listing_falls_back_to_unknown_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("select", APPOINTMENT_SELECT))
        .and(query_param("patient_id", "eq.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(1, "Requested", None)])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let Json(body) = list_appointments(
        State(config),
        Extension(TestUser::patient(3).to_user()),
        Query(AppointmentQueryParams::default()),
    ).await.unwrap();

    assert_eq!(body[0]["patient_name"], "Unknown");
    assert_eq!(body[0]["doctor_name"], "Unknown");
}

#[tokio::test]
async fn doctor_listing_is_scoped_to_doctor_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", "eq.5"))
        .and(query_param("order", "date.asc,time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row(1, "Requested", None),
            row(2, "Scheduled", Some(1)),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let Json(body) = list_appointments(
        State(config),
        Extension(TestUser::doctor(5).to_user()),
        Query(AppointmentQueryParams::default()),
    ).await.unwrap();

    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn patient_cannot_read_someone_elses_appointment() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(1, "Requested", None)).await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = get_appointment(State(config), Extension(TestUser::patient(8).to_user()), Path(1)).await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn queue_requires_doctor_for_staff() {
    let config = TestConfig::default().to_arc();
    let result = get_doctor_queue(
        State(config),
        Extension(TestUser::receptionist().to_user()),
        Query(QueueQuery::default()),
    ).await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

// ==============================================================================
// TRANSITIONS
// ==============================================================================

#[tokio::test]
async fn confirm_assigns_first_serial_of_the_day() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Requested", None)).await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("select", "serial_number"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.7"))
        .and(query_param("status", "in.(Requested)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Scheduled", Some(1))])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let Json(body) = confirm_appointment(State(config), Extension(TestUser::receptionist().to_user()), Path(7))
        .await
        .unwrap();

    assert_eq!(body["status"], "Scheduled");
    assert_eq!(body["serial_number"], 1);
}

#[tokio::test]
async fn confirm_retries_when_serial_is_taken() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Requested", None)).await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("select", "serial_number"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "serial_number": 1 }])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_serial_per_day\"",
            "details": "Key (doctor_id, date, serial_number)=(5, 2030-01-10, 2) already exists.",
            "hint": null
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Scheduled", Some(2))])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let Json(body) = confirm_appointment(State(config), Extension(TestUser::admin().to_user()), Path(7))
        .await
        .unwrap();

    assert_eq!(body["serial_number"], 2);
}

#[tokio::test]
async fn confirm_that_loses_a_race_reports_new_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Requested", None)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Cancelled", None)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("select", "serial_number"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = confirm_appointment(State(config), Extension(TestUser::receptionist().to_user()), Path(7)).await;

    match result {
        Err(AppError::BadRequest(msg)) => assert!(msg.contains("Cancelled")),
        other => panic!("expected BadRequest, got {:?}", other.map(|j| j.0)),
    }
}

#[tokio::test]
async fn patients_cannot_confirm() {
    let config = TestConfig::default().to_arc();
    let result = confirm_appointment(State(config), Extension(TestUser::patient(3).to_user()), Path(7)).await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn owner_cancels_and_frees_slot() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Scheduled", Some(1))).await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .and(query_param("status", "in.(Requested,Scheduled)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Cancelled", Some(1))])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let Json(body) = cancel_appointment(State(config), Extension(TestUser::patient(3).to_user()), Path(7))
        .await
        .unwrap();

    assert_eq!(body["status"], "Cancelled");
}

#[tokio::test]
async fn completed_appointment_cannot_be_cancelled() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Completed", Some(1))).await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let result = cancel_appointment(State(config), Extension(TestUser::receptionist().to_user()), Path(7)).await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn only_assigned_doctor_completes() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Scheduled", Some(1))).await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .and(query_param("status", "in.(Scheduled)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Completed", Some(1))])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();

    let denied = complete_appointment(State(config.clone()), Extension(TestUser::doctor(6).to_user()), Path(7)).await;
    assert_matches!(denied, Err(AppError::Forbidden(_)));

    let Json(body) = complete_appointment(State(config), Extension(TestUser::doctor(5).to_user()), Path(7))
        .await
        .unwrap();
    assert_eq!(body["status"], "Completed");
}

#[tokio::test]
async fn reschedule_keeps_request_pending_and_ignores_own_slot() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Requested", None)).await;
    mount_slot_check(&server, 5, json!([row(7, "Requested", None)])).await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .and(query_param("status", "in.(Requested)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Requested", None)])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let request = RescheduleAppointmentRequest {
        date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    };

    let Json(body) = reschedule_appointment(
        State(config),
        Extension(TestUser::patient(3).to_user()),
        Path(7),
        Json(request),
    ).await.unwrap();

    assert_eq!(body["status"], "Requested");
}

#[tokio::test]
async fn reschedule_into_occupied_slot_is_conflict() {
    let server = MockServer::start().await;
    mount_appointment(&server, MockPostgrestResponses::appointment_row(7, 3, 5, DAY, "11:00:00", "Requested", None)).await;
    mount_slot_check(&server, 5, json!([row(8, "Scheduled", Some(1))])).await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let request = RescheduleAppointmentRequest {
        date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    };

    let result = reschedule_appointment(
        State(config),
        Extension(TestUser::patient(3).to_user()),
        Path(7),
        Json(request),
    ).await;

    assert_matches!(result, Err(AppError::Conflict(ref msg)) if msg == "Slot not available");
}

#[tokio::test]
async fn reschedule_that_loses_the_slot_race_is_conflict() {
    let server = MockServer::start().await;
    mount_appointment(&server, MockPostgrestResponses::appointment_row(7, 3, 5, DAY, "11:00:00", "Requested", None)).await;
    mount_slot_check(&server, 5, json!([])).await;
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .and(query_param("status", "in.(Requested)"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_active_slot\"",
            "details": "Key (doctor_id, date, \"time\")=(5, 2030-01-10, 09:00:00) already exists.",
            "hint": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let request = RescheduleAppointmentRequest {
        date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    };

    let result = reschedule_appointment(
        State(config),
        Extension(TestUser::receptionist().to_user()),
        Path(7),
        Json(request),
    ).await;

    assert_matches!(result, Err(AppError::Conflict(ref msg)) if msg == "Slot not available");
}

#[tokio::test]
async fn scheduled_appointment_cannot_be_rescheduled() {
    let server = MockServer::start().await;
    mount_appointment(&server, row(7, "Scheduled", Some(1))).await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();
    let request = RescheduleAppointmentRequest {
        date: NaiveDate::from_ymd_opt(2030, 1, 11).unwrap(),
        time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    };

    let result = reschedule_appointment(
        State(config),
        Extension(TestUser::receptionist().to_user()),
        Path(7),
        Json(request),
    ).await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn delete_is_staff_only_and_404s_on_missing_rows() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_postgrest_url(server.uri()).to_arc();

    let denied = delete_appointment(State(config.clone()), Extension(TestUser::doctor(5).to_user()), Path(42)).await;
    assert_matches!(denied, Err(AppError::Forbidden(_)));

    let missing = delete_appointment(State(config), Extension(TestUser::admin().to_user()), Path(42)).await;
    assert_matches!(missing, Err(AppError::NotFound(_)));
}
