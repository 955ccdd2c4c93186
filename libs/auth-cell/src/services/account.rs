use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_models::auth::{Role, User};
use shared_utils::jwt::{issue_token, TokenSubject};
use shared_utils::validation::{require_non_blank, validate_email, validate_password, validate_phone};

use crate::models::{
    split_name, AuthError, AuthResponse, LinkedDoctor, LinkedPatient, LoginRequest,
    RegisterRequest, UpdateProfileRequest, UserAccount, UserProfile,
};
use crate::services::password::PasswordService;

pub const DEFAULT_PATIENT_DOB: &str = "2000-01-01";
pub const DEFAULT_SPECIALIZATION: &str = "General Practitioner";
const DEFAULT_GENDER: &str = "Other";

pub struct AccountService {
    db: PostgrestClient,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_hours: config.token_ttl_hours,
        }
    }

    /// Create an account and its linked patient or doctor profile. Anything
    /// but a Patient account needs an Admin `caller`.
    pub async fn register(&self, request: RegisterRequest, caller: Option<&User>) -> Result<UserProfile, AuthError> {
        let role = request.role.unwrap_or(Role::Patient);
        if role != Role::Patient && !caller.map(User::is_admin).unwrap_or(false) {
            return Err(AuthError::Forbidden(format!("Only Admins can register {} accounts", role)));
        }

        validate_registration(&request).map_err(AuthError::ValidationError)?;

        let email = request.email.trim().to_string();
        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = PasswordService::hash_password(&request.password)?;
        let account: UserAccount = self.db.insert("users", json!({
            "username": request.username.trim(),
            "email": email,
            "mobile": request.mobile,
            "role": role,
            "password_hash": password_hash,
        })).await?;

        if let Err(e) = self.create_linked_profile(&account, &request).await {
            error!("Profile creation failed for user {}, removing account: {}", account.id, e);
            if let Err(cleanup) = self.db.delete(&format!("/users?id=eq.{}", account.id)).await {
                error!("Failed to remove orphaned user {}: {}", account.id, cleanup);
            }
            return Err(e);
        }

        info!("Registered {} account {}", role, account.id);
        self.build_profile(&account).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let account = self
            .find_by_email(request.email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let verified = PasswordService::verify_password(&request.password, &account.password_hash)
            .unwrap_or_else(|e| {
                warn!("Unreadable password hash for user {}: {}", account.id, e);
                false
            });
        if !verified {
            debug!("Password mismatch for user {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        let profile = self.build_profile(&account).await?;
        let subject = TokenSubject {
            user_id: account.id,
            email: Some(account.email.clone()),
            role: account.role,
            patient_id: profile.patient_id,
            doctor_id: profile.doctor_id,
        };
        let token = issue_token(&subject, &self.jwt_secret, self.token_ttl_hours).map_err(AuthError::Token)?;

        info!("User {} logged in", account.id);
        Ok(AuthResponse { token, user: profile })
    }

    pub async fn current_profile(&self, user_id: i64) -> Result<UserProfile, AuthError> {
        let account = self.get_account(user_id).await?;
        self.build_profile(&account).await
    }

    pub async fn update_profile(&self, user_id: i64, request: UpdateProfileRequest) -> Result<UserProfile, AuthError> {
        let mut changes = Map::new();

        if let Some(username) = request.username {
            require_non_blank(&username, "Username").map_err(AuthError::ValidationError)?;
            changes.insert("username".to_string(), json!(username.trim()));
        }
        if let Some(mobile) = request.mobile {
            validate_phone(&mobile).map_err(AuthError::ValidationError)?;
            changes.insert("mobile".to_string(), json!(mobile));
        }
        if let Some(password) = request.password {
            validate_password(&password).map_err(AuthError::ValidationError)?;
            changes.insert("password_hash".to_string(), json!(PasswordService::hash_password(&password)?));
        }

        if changes.is_empty() {
            return Err(AuthError::ValidationError("No changes supplied".to_string()));
        }

        let mut rows: Vec<UserAccount> = self.db
            .update(&format!("/users?id=eq.{}", user_id), Value::Object(changes))
            .await?;
        if rows.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        info!("Profile updated for user {}", user_id);
        self.build_profile(&rows.swap_remove(0)).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserAccount>, AuthError> {
        let users: Vec<UserAccount> = self.db.request(Method::GET, "/users?order=id.asc", None).await?;
        Ok(users)
    }

    pub async fn delete_user(&self, caller: &User, user_id: i64) -> Result<(), AuthError> {
        if caller.id == user_id {
            return Err(AuthError::CannotDeleteSelf);
        }

        let removed = self.db.delete(&format!("/users?id=eq.{}", user_id)).await?;
        if removed == 0 {
            return Err(AuthError::UserNotFound);
        }
        info!("User {} deleted by {}", user_id, caller.id);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AuthError> {
        let path = format!("/users?email=eq.{}", urlencoding::encode(email));
        let mut rows: Vec<UserAccount> = self.db.request(Method::GET, &path, None).await?;
        Ok(rows.pop())
    }

    async fn get_account(&self, user_id: i64) -> Result<UserAccount, AuthError> {
        let path = format!("/users?id=eq.{}", user_id);
        let mut rows: Vec<UserAccount> = self.db.request(Method::GET, &path, None).await?;
        rows.pop().ok_or(AuthError::UserNotFound)
    }

    async fn create_linked_profile(&self, account: &UserAccount, request: &RegisterRequest) -> Result<(), AuthError> {
        let gender = request.gender.as_deref().unwrap_or(DEFAULT_GENDER);

        match account.role {
            Role::Patient => {
                let (first_name, last_name) = split_name(&account.username);
                let _: Value = self.db.insert("patients", json!({
                    "user_id": account.id,
                    "first_name": first_name,
                    "last_name": last_name,
                    "dob": DEFAULT_PATIENT_DOB,
                    "gender": gender,
                    "contact_number": request.mobile,
                    "email": account.email,
                })).await?;
            }
            Role::Doctor => {
                let _: Value = self.db.insert("doctors", json!({
                    "user_id": account.id,
                    "name": account.username,
                    "specialization": request.specialization.as_deref().unwrap_or(DEFAULT_SPECIALIZATION),
                    "gender": gender,
                    "contact": request.mobile,
                })).await?;
            }
            Role::Admin | Role::Receptionist => {}
        }
        Ok(())
    }

    /// Attach the linked patient or doctor id and display names.
    async fn build_profile(&self, account: &UserAccount) -> Result<UserProfile, AuthError> {
        let mut profile = UserProfile::from_account(account);

        match account.role {
            Role::Patient => {
                let path = format!("/patients?user_id=eq.{}&select=id,first_name,last_name,gender", account.id);
                let rows: Vec<LinkedPatient> = self.db.request(Method::GET, &path, None).await?;
                if let Some(patient) = rows.into_iter().next() {
                    profile.patient_id = Some(patient.id);
                    profile.first_name = Some(patient.first_name);
                    profile.last_name = Some(patient.last_name);
                    profile.gender = patient.gender;
                }
            }
            Role::Doctor => {
                let path = format!("/doctors?user_id=eq.{}&select=id,name,gender", account.id);
                let rows: Vec<LinkedDoctor> = self.db.request(Method::GET, &path, None).await?;
                if let Some(doctor) = rows.into_iter().next() {
                    let (first_name, last_name) = split_name(&doctor.name);
                    profile.doctor_id = Some(doctor.id);
                    profile.first_name = Some(first_name);
                    profile.last_name = Some(last_name);
                    profile.gender = doctor.gender;
                }
            }
            Role::Admin | Role::Receptionist => {}
        }

        Ok(profile)
    }
}

/// First failing rule wins, in the order the registration form shows them.
pub fn validate_registration(request: &RegisterRequest) -> Result<(), String> {
    require_non_blank(&request.username, "Username")?;
    validate_email(request.email.trim())?;
    validate_password(&request.password)?;
    validate_phone(&request.mobile)?;
    Ok(())
}
