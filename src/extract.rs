use std::marker::PhantomData;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::IntoResponse,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use tracing::warn;

use crate::error::ApiError;

pub const INVALID_BODY: &str = "Invalid request body";

/// JSON request body read regardless of `Content-Type`.
///
/// Any read or parse failure becomes `ApiError::Validation`, rendered by the
/// service error type `E`, so clients always get that service's JSON shape.
pub struct JsonBody<T, E>(pub T, PhantomData<fn() -> E>);

impl<T, E> JsonBody<T, E> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[async_trait]
impl<T, E, S> FromRequest<S> for JsonBody<T, E>
where
    T: DeserializeOwned,
    E: From<ApiError> + IntoResponse,
    S: Send + Sync,
{
    type Rejection = E;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            warn!(error = %e, "request body unreadable");
            E::from(ApiError::Validation(INVALID_BODY.into()))
        })?;
        let value = parse_json(&bytes).map_err(E::from)?;
        Ok(JsonBody(value, PhantomData))
    }
}

pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!(error = %e, "request body rejected");
        ApiError::Validation(INVALID_BODY.into())
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// For `Option<String>` fields that clients also send as bare numbers,
/// e.g. `"phone": 5551234567`. Pair with `#[serde(default)]`.
pub fn text_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextOrNumber>::deserialize(de)?.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    }))
}
