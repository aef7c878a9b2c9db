use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    api_key::RequireApiKey,
    dto::{present, LoginRequest, MessageResponse, RegisterRequest, SheetUserView},
    store::{Registered, SheetUser, UserSheetStore},
};
use crate::{
    error::ApiError,
    extract::JsonBody,
    password::{check_password, hash_password, PasswordCheck},
    state::SheetsState,
};

pub fn sheet_routes() -> Router<SheetsState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
}

/// JSON failure in the `{message}` shape.
#[derive(Debug)]
pub struct SheetsError(ApiError);

impl From<ApiError> for SheetsError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for SheetsError {
    fn from(e: anyhow::Error) -> Self {
        Self(ApiError::Internal(e))
    }
}

impl IntoResponse for SheetsError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.client_message("Server error");
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

type SheetsJson<T> = JsonBody<T, SheetsError>;

/// Runs a blocking store operation off the async workers.
async fn on_store<T, F>(store: &Arc<UserSheetStore>, op: F) -> anyhow::Result<T>
where
    F: FnOnce(&UserSheetStore) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .context("sheet task failed")?
}

#[instrument(skip(state, body))]
pub async fn register_user(
    _key: RequireApiKey,
    State(state): State<SheetsState>,
    body: SheetsJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, SheetsError> {
    let payload = body.into_inner();
    let (Some(email), Some(phone), Some(password)) = (
        present(payload.email),
        present(payload.phone),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation("Missing fields".into()).into());
    };

    let password_hash = hash_password(&password)?;
    let row = SheetUser {
        email: email.clone(),
        phone,
        password_hash,
    };

    match on_store(&state.store, move |store| store.register(row)).await? {
        Registered::Created => {
            info!(email = %email, "registered user");
            Ok(Json(MessageResponse::new("User registered successfully")))
        }
        Registered::Duplicate => {
            warn!(email = %email, "user already exists");
            Err(ApiError::Conflict("User already exists".into()).into())
        }
    }
}

#[instrument(skip(state, body))]
pub async fn login_user(
    _key: RequireApiKey,
    State(state): State<SheetsState>,
    body: SheetsJson<LoginRequest>,
) -> Result<Json<MessageResponse>, SheetsError> {
    let payload = body.into_inner();
    let (Some(identifier), Some(password)) = (
        present(payload.email_or_phone),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation("Missing fields".into()).into());
    };

    let Some(sheet) = on_store(&state.store, |store| store.snapshot()).await? else {
        return Err(ApiError::NotFound("No users registered yet!".into()).into());
    };

    for user in sheet.matching(&identifier) {
        match check_password(&password, &user.password_hash) {
            PasswordCheck::Match => {
                info!(identifier = %identifier, "login success");
                return Ok(Json(MessageResponse {
                    message: "Login successful".into(),
                    user: Some(SheetUserView {
                        email: user.email.clone(),
                        phone: user.phone.clone(),
                    }),
                }));
            }
            PasswordCheck::Mismatch => {}
            PasswordCheck::NotHashed => {
                warn!(email = %user.email, "sheet row holds a plain-text password; skipped");
            }
        }
    }

    warn!(identifier = %identifier, "invalid login attempt");
    Err(ApiError::Auth("Invalid credentials".into()).into())
}
