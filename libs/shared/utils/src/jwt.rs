use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtClaims, JwtHeader, Role, User};

type HmacSha256 = Hmac<Sha256>;

/// Identity baked into an issued token.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: i64,
    pub email: Option<String>,
    pub role: Role,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

pub fn issue_token(subject: &TokenSubject, jwt_secret: &str, ttl_hours: i64) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let exp = now + Duration::hours(ttl_hours);

    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = JwtClaims {
        sub: subject.user_id.to_string(),
        email: subject.email.clone(),
        role: subject.role,
        patient_id: subject.patient_id,
        doctor_id: subject.doctor_id,
        iat: Some(now.timestamp().max(0) as u64),
        exp: Some(exp.timestamp().max(0) as u64),
    };

    let header_json = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    let claims_json = serde_json::to_string(&claims).map_err(|e| e.to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signature_string = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signature_string.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp().max(0) as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let id = claims.sub.parse::<i64>()
        .map_err(|_| "Invalid subject claim".to_string())?;

    let user = User {
        id,
        email: claims.email,
        role: claims.role,
        patient_id: claims.patient_id,
        doctor_id: claims.doctor_id,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor_subject() -> TokenSubject {
        TokenSubject {
            user_id: 12,
            email: Some("house@gmail.com".to_string()),
            role: Role::Doctor,
            patient_id: None,
            doctor_id: Some(5),
        }
    }

    #[test]
    fn issued_token_validates_with_same_secret() {
        let token = issue_token(&doctor_subject(), "s3cret", 1).unwrap();
        let user = validate_token(&token, "s3cret").unwrap();

        assert_eq!(user.id, 12);
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.doctor_id, Some(5));
        assert_eq!(user.patient_id, None);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue_token(&doctor_subject(), "s3cret", 1).unwrap();
        assert_eq!(validate_token(&token, "other").unwrap_err(), "Invalid token signature");
    }

    #[test]
    fn rejects_expired_token() {
        let token = issue_token(&doctor_subject(), "s3cret", -1).unwrap();
        assert_eq!(validate_token(&token, "s3cret").unwrap_err(), "Token expired");
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(validate_token("not-a-token", "s3cret").unwrap_err(), "Invalid token format");
        assert!(issue_token(&doctor_subject(), "", 1).is_err());
    }
}
