use serde::{Deserialize, Serialize};

use crate::extract::text_or_number;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub email_or_phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SheetUserView {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SheetUserView>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user: None,
        }
    }
}

/// Trimmed, non-empty value or `None`.
pub(crate) fn present(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
