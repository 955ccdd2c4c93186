use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_utils::validation::{require_non_blank, validate_phone};

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, DoctorSearchFilters, UpdateDoctorRequest};

pub struct DoctorService {
    db: PostgrestClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        request.validate().map_err(DoctorError::ValidationError)?;

        let doctor: Doctor = self.db.insert("doctors", json!({
            "name": request.name.trim(),
            "specialization": request.specialization.trim(),
            "gender": request.gender,
            "contact": request.contact,
            "availability": request.availability,
        })).await?;

        info!("Doctor {} created", doctor.id);
        Ok(doctor)
    }

    pub async fn list_doctors(&self, filters: &DoctorSearchFilters) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors with filters {:?}", filters);

        let mut query_parts = Vec::new();
        if let Some(specialization) = filters.specialization.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query_parts.push(format!("specialization=ilike.*{}*", urlencoding::encode(specialization)));
        }
        query_parts.push("order=name.asc".to_string());

        let path = format!("/doctors?{}", query_parts.join("&"));
        let doctors: Vec<Doctor> = self.db.request(Method::GET, &path, None).await?;
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        let path = format!("/doctors?id=eq.{}", doctor_id);
        let mut rows: Vec<Doctor> = self.db.request(Method::GET, &path, None).await?;
        rows.pop().ok_or(DoctorError::NotFound)
    }

    pub async fn update_doctor(&self, doctor_id: i64, request: UpdateDoctorRequest) -> Result<Doctor, DoctorError> {
        let mut update_data = Map::new();

        if let Some(name) = request.name {
            require_non_blank(&name, "Name").map_err(DoctorError::ValidationError)?;
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(specialization) = request.specialization {
            require_non_blank(&specialization, "Specialization").map_err(DoctorError::ValidationError)?;
            update_data.insert("specialization".to_string(), json!(specialization.trim()));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender));
        }
        if let Some(contact) = request.contact {
            validate_phone(&contact).map_err(DoctorError::ValidationError)?;
            update_data.insert("contact".to_string(), json!(contact));
        }
        if let Some(availability) = request.availability {
            update_data.insert("availability".to_string(), json!(availability));
        }

        if update_data.is_empty() {
            return Err(DoctorError::ValidationError("No changes supplied".to_string()));
        }

        let path = format!("/doctors?id=eq.{}", doctor_id);
        let mut rows: Vec<Doctor> = self.db.update(&path, Value::Object(update_data)).await?;
        let doctor = rows.pop().ok_or(DoctorError::NotFound)?;

        info!("Doctor {} updated", doctor_id);
        Ok(doctor)
    }

    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<(), DoctorError> {
        let removed = self.db.delete(&format!("/doctors?id=eq.{}", doctor_id)).await?;
        if removed == 0 {
            return Err(DoctorError::NotFound);
        }
        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }
}
