use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use super::dto::MessageResponse;
use crate::state::SheetsState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared secret configured for the sheets service, if any.
#[derive(Clone)]
pub struct ApiKey(pub Option<String>);

impl FromRef<SheetsState> for ApiKey {
    fn from_ref(state: &SheetsState) -> Self {
        ApiKey(state.config.api_key.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// With no key configured every request passes. Otherwise the `x-api-key`
/// header, or failing that the `api_key` query parameter, must match.
pub fn authorized(expected: Option<&str>, supplied: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => supplied == Some(expected),
    }
}

/// Guard for routes that need the shared secret.
#[derive(Debug)]
pub struct RequireApiKey;

#[async_trait]
impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
    ApiKey: FromRef<S>,
{
    type Rejection = (StatusCode, Json<MessageResponse>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ApiKey(expected) = ApiKey::from_ref(state);
        if expected.is_none() {
            return Ok(RequireApiKey);
        }

        let supplied = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .or_else(|| {
                Query::<ApiKeyQuery>::try_from_uri(&parts.uri)
                    .ok()
                    .and_then(|Query(q)| q.api_key)
            });

        if authorized(expected.as_deref(), supplied.as_deref()) {
            Ok(RequireApiKey)
        } else {
            warn!(path = %parts.uri.path(), "rejected request without valid api key");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(MessageResponse::new("Unauthorized")),
            ))
        }
    }
}
