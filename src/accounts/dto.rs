use serde::{Deserialize, Serialize};

use crate::extract::text_or_number;

/// Request body for `POST /register`. Fields are optional so that a missing
/// one surfaces as a validation error rather than a parse rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub email_or_phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub email_or_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetFormQuery {
    pub token: Option<String>,
}

/// Form body posted by the reset page.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_link: Option<String>,
}

impl AccountResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            reset_link: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            reset_link: None,
        }
    }
}
