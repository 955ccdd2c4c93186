use std::sync::Arc;

use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

use crate::jwt::{issue_token, TokenSubject};

pub struct TestConfig {
    pub jwt_secret: String,
    pub postgrest_url: String,
    pub postgrest_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            postgrest_url: "http://localhost:3001".to_string(),
            postgrest_api_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the config at a mock PostgREST server.
    pub fn with_postgrest_url(url: impl Into<String>) -> Self {
        Self {
            postgrest_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            postgrest_url: self.postgrest_url.clone(),
            postgrest_api_key: self.postgrest_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            token_ttl_hours: 24,
            bind_address: "127.0.0.1:0".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

impl TestUser {
    pub fn new(id: i64, email: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            role,
            patient_id: None,
            doctor_id: None,
        }
    }

    pub fn patient(patient_id: i64) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::new(1000 + patient_id, "patient@gmail.com", Role::Patient)
        }
    }

    pub fn doctor(doctor_id: i64) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Self::new(2000 + doctor_id, "doctor@gmail.com", Role::Doctor)
        }
    }

    pub fn receptionist() -> Self {
        Self::new(3, "frontdesk@gmail.com", Role::Receptionist)
    }

    pub fn admin() -> Self {
        Self::new(1, "admin@gmail.com", Role::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: Some(self.email.clone()),
            role: self.role,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
        }
    }

    pub fn to_subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.id,
            email: Some(self.email.clone()),
            role: self.role,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(&user.to_subject(), secret, exp_hours.unwrap_or(24))
            .expect("test secret must not be empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Row shapes as PostgREST returns them.
pub struct MockPostgrestResponses;

impl MockPostgrestResponses {
    pub fn patient_row(id: i64, first_name: &str, last_name: &str) -> Value {
        json!({
            "id": id,
            "user_id": null,
            "first_name": first_name,
            "last_name": last_name,
            "dob": "1990-04-12",
            "gender": "Female",
            "contact_number": "+919876543210",
            "email": format!("{}@gmail.com", first_name.to_lowercase()),
            "address": null,
            "blood_group": "O+",
            "emergency_contact": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_row(id: i64, name: &str, specialization: &str) -> Value {
        json!({
            "id": id,
            "user_id": null,
            "name": name,
            "specialization": specialization,
            "gender": null,
            "contact": "+15550000000",
            "availability": "Mon-Fri 09:00-17:00"
        })
    }

    pub fn appointment_row(
        id: i64,
        patient_id: i64,
        doctor_id: i64,
        date: &str,
        time: &str,
        status: &str,
        serial_number: Option<i32>,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "date": date,
            "time": time,
            "reason": "Follow-up",
            "status": status,
            "serial_number": serial_number,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn user_row(id: i64, username: &str, email: &str, role: &str, password_hash: &str) -> Value {
        json!({
            "id": id,
            "username": username,
            "email": email,
            "mobile": "+15550000000",
            "role": role,
            "password_hash": password_hash,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn notification_row(id: i64, doctor_id: i64, message: &str, is_read: bool) -> Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "message": message,
            "is_read": is_read,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn medical_record_row(id: i64, patient_id: i64, doctor_id: i64, diagnosis: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "diagnosis": diagnosis,
            "prescription": [{ "drug": "Amoxicillin", "dose": "500mg" }],
            "tests": null,
            "notes": null,
            "symptoms": "fever",
            "visit_date": "2024-01-10T09:30:00Z"
        })
    }

    pub fn error_response(code: &str, message: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
