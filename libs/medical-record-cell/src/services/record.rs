use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_utils::validation::require_non_blank;

use crate::models::{
    CreateMedicalRecordRequest, MedicalRecord, MedicalRecordError, MedicalRecordRow,
    UpdateMedicalRecordRequest, RECORD_SELECT,
};

pub struct MedicalRecordService {
    db: PostgrestClient,
}

impl MedicalRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Visit history, newest first. `None` lists every patient's records.
    pub async fn list_records(&self, patient_id: Option<i64>, today: NaiveDate) -> Result<Vec<MedicalRecord>, MedicalRecordError> {
        debug!("Listing medical records for patient {:?}", patient_id);

        let mut query_parts = vec![format!("select={}", RECORD_SELECT)];
        if let Some(patient_id) = patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        query_parts.push("order=visit_date.desc".to_string());

        let path = format!("/medical_records?{}", query_parts.join("&"));
        let rows: Vec<MedicalRecordRow> = self.db.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(|row| row.into_record(today)).collect())
    }

    pub async fn get_record(&self, record_id: i64, today: NaiveDate) -> Result<MedicalRecord, MedicalRecordError> {
        let path = format!("/medical_records?id=eq.{}&select={}", record_id, RECORD_SELECT);
        let mut rows: Vec<MedicalRecordRow> = self.db.request(Method::GET, &path, None).await?;
        rows.pop()
            .map(|row| row.into_record(today))
            .ok_or(MedicalRecordError::NotFound)
    }

    /// Stores a record written by `doctor_id`. The caller resolves which doctor that is.
    pub async fn create_record(
        &self,
        doctor_id: i64,
        request: CreateMedicalRecordRequest,
        today: NaiveDate,
    ) -> Result<MedicalRecord, MedicalRecordError> {
        require_non_blank(&request.diagnosis, "Diagnosis").map_err(MedicalRecordError::ValidationError)?;

        let created: Value = self.db.insert("medical_records", json!({
            "patient_id": request.patient_id,
            "doctor_id": doctor_id,
            "diagnosis": request.diagnosis.trim(),
            "prescription": request.prescription,
            "tests": request.tests,
            "notes": request.notes,
            "symptoms": request.symptoms,
        })).await?;

        let record_id = created["id"]
            .as_i64()
            .ok_or_else(|| MedicalRecordError::DatabaseError("Inserted record has no id".to_string()))?;

        info!("Medical record {} created for patient {} by doctor {}", record_id, request.patient_id, doctor_id);
        self.get_record(record_id, today).await
    }

    pub async fn update_record(
        &self,
        record_id: i64,
        request: UpdateMedicalRecordRequest,
        today: NaiveDate,
    ) -> Result<MedicalRecord, MedicalRecordError> {
        let mut update_data = Map::new();

        if let Some(diagnosis) = request.diagnosis {
            require_non_blank(&diagnosis, "Diagnosis").map_err(MedicalRecordError::ValidationError)?;
            update_data.insert("diagnosis".to_string(), json!(diagnosis.trim()));
        }
        if let Some(prescription) = request.prescription {
            update_data.insert("prescription".to_string(), prescription);
        }
        if let Some(tests) = request.tests {
            update_data.insert("tests".to_string(), json!(tests));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(symptoms) = request.symptoms {
            update_data.insert("symptoms".to_string(), json!(symptoms));
        }

        if update_data.is_empty() {
            return Err(MedicalRecordError::ValidationError("No changes supplied".to_string()));
        }

        let path = format!("/medical_records?id=eq.{}&select={}", record_id, RECORD_SELECT);
        let mut rows: Vec<MedicalRecordRow> = self.db.update(&path, Value::Object(update_data)).await?;
        let record = rows.pop().ok_or(MedicalRecordError::NotFound)?;

        info!("Medical record {} updated", record_id);
        Ok(record.into_record(today))
    }

    pub async fn delete_record(&self, record_id: i64) -> Result<(), MedicalRecordError> {
        let removed = self.db.delete(&format!("/medical_records?id=eq.{}", record_id)).await?;
        if removed == 0 {
            return Err(MedicalRecordError::NotFound);
        }
        info!("Medical record {} deleted", record_id);
        Ok(())
    }
}
