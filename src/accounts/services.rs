use lazy_static::lazy_static;
use regex::Regex;

use crate::accounts::dto::RegisterRequest;
use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[\w.-]+@[\w.-]+\.[A-Za-z]{2,}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{6,15}$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Registration input after normalization and validation.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub country_code: String,
    pub phone: String,
    pub password: String,
}

pub fn validate_registration(req: RegisterRequest) -> Result<Registration, ApiError> {
    let email = req.email.unwrap_or_default().trim().to_lowercase();
    let phone = req.phone.unwrap_or_default().trim().to_string();
    let password = req.password.unwrap_or_default();

    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email address.".into()));
    }
    if !is_valid_phone(&phone) {
        return Err(ApiError::Validation("Invalid phone number.".into()));
    }
    if password.is_empty() {
        return Err(ApiError::Validation("Password is required.".into()));
    }

    Ok(Registration {
        name: req.name.unwrap_or_default().trim().to_string(),
        email,
        country_code: req.country_code.unwrap_or_default().trim().to_string(),
        phone,
        password,
    })
}

/// Lowercased, trimmed login / reset identifier. Blank is a validation error.
pub fn normalize_identifier(raw: Option<String>) -> Result<String, ApiError> {
    let identifier = raw.unwrap_or_default().trim().to_lowercase();
    if identifier.is_empty() {
        return Err(ApiError::Validation("Email or phone is required.".into()));
    }
    Ok(identifier)
}
