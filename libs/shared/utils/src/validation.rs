use std::sync::OnceLock;

use regex::Regex;

pub const ALLOWED_EMAIL_DOMAINS: [&str; 5] = [
    "gmail.com",
    "ymail.com",
    "outlook.com",
    "yahoo.com",
    "icloud.com",
];

const PHONE_PATTERN: &str = r"^\+\d{1,4}\d{7,15}$";
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex"))
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let domain = match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() => domain,
        _ => "",
    };

    if ALLOWED_EMAIL_DOMAINS.contains(&domain.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(format!("Email must be one of: {}", ALLOWED_EMAIL_DOMAINS.join(", ")))
    }
}

/// International mobile number with a leading `+` and country code.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err("Mobile number must include country code (e.g., +1234567890)".to_string())
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters long", MIN_PASSWORD_LENGTH));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err("Password must contain at least one special character".to_string());
    }
    Ok(())
}

pub fn require_non_blank(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}
