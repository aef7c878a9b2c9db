use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::dto::{ScanRequest, ScanResponse};
use crate::{
    error::ApiError, extract::JsonBody, sheets::api_key::RequireApiKey, state::SheetsState,
};

pub fn scan_routes() -> Router<SheetsState> {
    Router::new().route("/scan", post(run_scan))
}

/// JSON failure in the `{error}` shape.
#[derive(Debug)]
pub struct ScanError(ApiError);

impl From<ApiError> for ScanError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.client_message("Server error");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[instrument(skip(state, body))]
pub async fn run_scan(
    _key: RequireApiKey,
    State(state): State<SheetsState>,
    body: JsonBody<ScanRequest, ScanError>,
) -> Result<Json<ScanResponse>, ScanError> {
    let payload = body.into_inner();
    info!(
        scan_target = ?payload.target,
        scan_type = %payload.scan_type,
        ports = ?payload.ports,
        "scan request received"
    );

    let plan = match payload.into_plan() {
        Ok(p) => p,
        Err(e) => {
            warn!(reason = %e, "scan request rejected");
            return Err(e.into());
        }
    };

    info!(scan_target = %plan.target, flags = ?plan.flags, "running scan");
    let output = state
        .scanner
        .run(&plan.target, &plan.flags, state.config.scan_timeout())
        .await
        .map_err(|e| {
            warn!(error = %e, "scan failed");
            ApiError::from(e)
        })?;

    Ok(Json(ScanResponse { output }))
}
