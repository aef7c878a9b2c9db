use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::checks::assess;
use crate::{
    extract::JsonBody,
    sheets::{api_key::RequireApiKey, handlers::SheetsError},
    state::SheetsState,
};

pub fn linkcheck_routes() -> Router<SheetsState> {
    Router::new().route("/check-url", post(check_url))
}

#[derive(Debug, Deserialize)]
pub struct CheckUrlRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckUrlResponse {
    pub url: String,
    pub host: String,
    pub suspicious: bool,
    pub reasons: Vec<String>,
    pub message: String,
}

#[instrument(skip(body))]
pub async fn check_url(
    _key: RequireApiKey,
    body: JsonBody<CheckUrlRequest, SheetsError>,
) -> Result<Json<CheckUrlResponse>, SheetsError> {
    let url = body.into_inner().url.unwrap_or_default();
    let assessment = assess(&url).map_err(|e| {
        warn!(reason = %e, "url check rejected");
        SheetsError::from(e)
    })?;

    info!(
        host = %assessment.host,
        suspicious = assessment.is_suspicious(),
        findings = assessment.findings.len(),
        "url checked"
    );
    Ok(Json(CheckUrlResponse {
        url: url.trim().to_string(),
        host: assessment.host.clone(),
        suspicious: assessment.is_suspicious(),
        reasons: assessment.findings.iter().map(ToString::to_string).collect(),
        message: assessment.summary(),
    }))
}

