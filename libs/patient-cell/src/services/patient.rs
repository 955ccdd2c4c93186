use std::collections::BTreeSet;

use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_utils::validation::{require_non_blank, validate_email, validate_phone};

use crate::models::{
    parse_dob, CreatePatientRequest, Patient, PatientError, PatientListQuery, UpdatePatientRequest,
};

const DEFAULT_GENDER: &str = "Other";

#[derive(Debug, Deserialize)]
struct PatientIdRow {
    patient_id: i64,
}

pub struct PatientService {
    db: PostgrestClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let dob = request.validate().map_err(PatientError::ValidationError)?;
        let email = request.normalized_email();

        if let Some(email) = email.as_deref() {
            debug!("Checking for existing patient with email {}", email);
            let path = format!("/patients?email=eq.{}&select=id", urlencoding::encode(email));
            let existing: Vec<Value> = self.db.request(Method::GET, &path, None).await?;
            if !existing.is_empty() {
                return Err(PatientError::EmailAlreadyExists);
            }
        }

        let patient: Patient = self.db.insert("patients", json!({
            "first_name": request.first_name.trim(),
            "last_name": request.last_name.trim(),
            "dob": dob.format("%Y-%m-%d").to_string(),
            "gender": request.gender.as_deref().unwrap_or(DEFAULT_GENDER),
            "contact_number": request.contact_number,
            "email": email,
            "address": request.address,
            "blood_group": request.blood_group,
            "emergency_contact": request.emergency_contact,
        })).await?;

        info!("Patient {} created", patient.id);
        Ok(patient)
    }

    /// All patients, or only those with at least one appointment with `doctor_id`.
    pub async fn list_patients(&self, query: &PatientListQuery) -> Result<Vec<Patient>, PatientError> {
        let mut query_parts = Vec::new();

        if let Some(doctor_id) = query.doctor_id {
            let ids = self.patient_ids_for_doctor(doctor_id).await?;
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
            query_parts.push(format!("id=in.({})", ids.join(",")));
        }

        if let Some(filter) = query.search.as_deref().and_then(name_search_filter) {
            query_parts.push(filter);
        }

        query_parts.push("order=last_name.asc,first_name.asc".to_string());

        let path = format!("/patients?{}", query_parts.join("&"));
        let patients: Vec<Patient> = self.db.request(Method::GET, &path, None).await?;
        Ok(patients)
    }

    async fn patient_ids_for_doctor(&self, doctor_id: i64) -> Result<BTreeSet<i64>, PatientError> {
        let path = format!("/appointments?doctor_id=eq.{}&select=patient_id", doctor_id);
        let rows: Vec<PatientIdRow> = self.db.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(|row| row.patient_id).collect())
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        let path = format!("/patients?id=eq.{}", patient_id);
        let mut rows: Vec<Patient> = self.db.request(Method::GET, &path, None).await?;
        rows.pop().ok_or(PatientError::NotFound)
    }

    /// Partial update; fields are validated the same way as on creation.
    pub async fn update_patient(&self, patient_id: i64, request: UpdatePatientRequest) -> Result<Patient, PatientError> {
        let changes = build_patient_changes(request).map_err(PatientError::ValidationError)?;

        let path = format!("/patients?id=eq.{}", patient_id);
        let mut rows: Vec<Patient> = self.db.update(&path, Value::Object(changes)).await?;
        let patient = rows.pop().ok_or(PatientError::NotFound)?;

        info!("Patient {} updated", patient_id);
        Ok(patient)
    }

    pub async fn delete_patient(&self, patient_id: i64) -> Result<(), PatientError> {
        let removed = self.db.delete(&format!("/patients?id=eq.{}", patient_id)).await?;
        if removed == 0 {
            return Err(PatientError::NotFound);
        }
        info!("Patient {} deleted", patient_id);
        Ok(())
    }
}

fn build_patient_changes(request: UpdatePatientRequest) -> Result<Map<String, Value>, String> {
    let mut update_data = Map::new();

    if let Some(first_name) = request.first_name {
        require_non_blank(&first_name, "First name")?;
        update_data.insert("first_name".to_string(), json!(first_name.trim()));
    }
    if let Some(last_name) = request.last_name {
        require_non_blank(&last_name, "Last name")?;
        update_data.insert("last_name".to_string(), json!(last_name.trim()));
    }
    if let Some(dob) = request.dob {
        let dob = parse_dob(&dob)?;
        update_data.insert("dob".to_string(), json!(dob.format("%Y-%m-%d").to_string()));
    }
    if let Some(gender) = request.gender {
        update_data.insert("gender".to_string(), json!(gender));
    }
    if let Some(contact_number) = request.contact_number {
        validate_phone(&contact_number)?;
        update_data.insert("contact_number".to_string(), json!(contact_number));
    }
    if let Some(email) = request.email {
        let email = email.trim();
        if email.is_empty() {
            update_data.insert("email".to_string(), Value::Null);
        } else {
            validate_email(email)?;
            update_data.insert("email".to_string(), json!(email));
        }
    }
    if let Some(address) = request.address {
        update_data.insert("address".to_string(), json!(address));
    }
    if let Some(blood_group) = request.blood_group {
        update_data.insert("blood_group".to_string(), json!(blood_group));
    }
    if let Some(emergency_contact) = request.emergency_contact {
        update_data.insert("emergency_contact".to_string(), json!(emergency_contact));
    }

    update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
    Ok(update_data)
}

/// Characters that delimit or quote values inside a PostgREST logic tree.
const RESERVED_IN_FILTER: &[char] = &[',', '(', ')', '"', '\\', '*', ':'];

/// `or=(...)` filter matching `term` in either name, or `None` when nothing
/// searchable is left once reserved characters are removed.
pub fn name_search_filter(term: &str) -> Option<String> {
    let cleaned: String = term.chars().filter(|c| !RESERVED_IN_FILTER.contains(c)).collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    let term = urlencoding::encode(&cleaned);
    Some(format!("or=(first_name.ilike.*{}*,last_name.ilike.*{}*)", term, term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_bad_phone_and_clears_blank_email() {
        let bad = UpdatePatientRequest { contact_number: Some("12345".to_string()), ..Default::default() };
        assert!(build_patient_changes(bad).is_err());

        let clear = UpdatePatientRequest { email: Some("  ".to_string()), ..Default::default() };
        let changes = build_patient_changes(clear).unwrap();
        assert_eq!(changes["email"], Value::Null);
        assert!(changes.contains_key("updated_at"));
    }

    #[test]
    fn search_terms_cannot_break_out_of_the_or_filter() {
        assert_eq!(
            name_search_filter("Rao").as_deref(),
            Some("or=(first_name.ilike.*Rao*,last_name.ilike.*Rao*)")
        );
        assert_eq!(
            name_search_filter("Rao),id.gt.(0").as_deref(),
            Some("or=(first_name.ilike.*Raoid.gt.0*,last_name.ilike.*Raoid.gt.0*)")
        );
        assert_eq!(
            name_search_filter(" Asha  Rao ").as_deref(),
            Some("or=(first_name.ilike.*Asha%20Rao*,last_name.ilike.*Asha%20Rao*)")
        );
        assert_eq!(name_search_filter("(),*"), None);
        assert_eq!(name_search_filter("   "), None);
    }
}
