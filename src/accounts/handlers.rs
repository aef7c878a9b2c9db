use axum::{
    extract::{FromRef, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            AccountResponse, LoginRequest, RegisterRequest, ResetFormQuery, ResetPasswordForm,
            ResetRequest,
        },
        pages,
        repo_types::{NewUser, User},
        reset_token::ResetKeys,
        services::{normalize_identifier, validate_registration},
    },
    error::ApiError,
    extract::JsonBody,
    password::{check_password, hash_password, PasswordCheck},
    state::AccountsState,
};

const INVALID_TOKEN: &str = "Invalid or expired token.";

pub fn account_routes() -> Router<AccountsState> {
    Router::new()
        .route("/", get(home))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/request-reset", post(request_reset))
        .route("/reset-password", get(reset_form).post(reset_password))
}

/// JSON failure in the `{success: false, message}` shape.
#[derive(Debug)]
pub struct AccountsError(ApiError);

impl From<ApiError> for AccountsError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for AccountsError {
    fn from(e: anyhow::Error) -> Self {
        Self(ApiError::Internal(e))
    }
}

impl IntoResponse for AccountsError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.client_message("Internal server error.");
        (status, Json(AccountResponse::failed(message))).into_response()
    }
}

type AccountsJson<T> = JsonBody<T, AccountsError>;

pub async fn home() -> Html<&'static str> {
    Html(pages::index_page())
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AccountsState>,
    body: AccountsJson<RegisterRequest>,
) -> Result<Json<AccountResponse>, AccountsError> {
    let payload = body.into_inner();
    let reg = match validate_registration(payload) {
        Ok(r) => r,
        Err(e) => {
            warn!(reason = %e, "registration rejected");
            return Err(e.into());
        }
    };

    if User::find_by_email_or_phone(&state.db, &reg.email, &reg.phone)
        .await?
        .is_some()
    {
        warn!(email = %reg.email, "user already exists");
        return Err(ApiError::Conflict("User already exists.".into()).into());
    }

    let hash = hash_password(&reg.password)?;
    let new_user = NewUser {
        name: &reg.name,
        email: &reg.email,
        country_code: &reg.country_code,
        phone: &reg.phone,
        password_hash: &hash,
    };

    match User::create(&state.db, &new_user).await? {
        Some(user) => {
            info!(user_id = user.id, email = %user.email, "user registered");
            Ok(Json(AccountResponse::ok("Registration successful!")))
        }
        None => {
            warn!(email = %reg.email, "email taken during insert");
            Err(ApiError::Conflict("User already exists.".into()).into())
        }
    }
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AccountsState>,
    body: AccountsJson<LoginRequest>,
) -> Result<Json<AccountResponse>, AccountsError> {
    let payload = body.into_inner();
    let identifier = normalize_identifier(payload.email_or_phone)?;
    let password = payload.password.unwrap_or_default();

    let Some(user) = User::find_by_identifier(&state.db, &identifier).await? else {
        warn!(identifier = %identifier, "login unknown identifier");
        return Err(ApiError::Auth("Invalid credentials.".into()).into());
    };

    match check_password(&password, &user.password_hash) {
        PasswordCheck::Match => {}
        PasswordCheck::Mismatch => {
            warn!(user_id = user.id, "login invalid password");
            return Err(ApiError::Auth("Invalid credentials.".into()).into());
        }
        PasswordCheck::NotHashed => {
            error!(user_id = user.id, "stored password is not an argon2 hash");
            return Err(ApiError::Auth("Invalid credentials.".into()).into());
        }
    }

    info!(user_id = user.id, "user logged in");
    let name = user.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(user.email.as_str());
    Ok(Json(AccountResponse::ok(format!("Welcome {}!", name))))
}

#[instrument(skip(state, headers, body))]
pub async fn request_reset(
    State(state): State<AccountsState>,
    headers: HeaderMap,
    body: AccountsJson<ResetRequest>,
) -> Result<Json<AccountResponse>, AccountsError> {
    let payload = body.into_inner();
    let identifier = normalize_identifier(payload.email_or_phone)?;
    let keys = ResetKeys::from_ref(&state);
    let token = keys.issue(&identifier)?;

    let base = match &state.config.public_base_url {
        Some(url) => url.clone(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{}/", host)
        }
    };
    let reset_link = format!("{}reset-password?token={}", base, token);

    info!(identifier = %identifier, "reset link generated");
    Ok(Json(AccountResponse {
        reset_link: Some(reset_link),
        ..AccountResponse::ok("Reset link generated.")
    }))
}

pub async fn reset_form(Query(q): Query<ResetFormQuery>) -> Html<String> {
    Html(pages::reset_page(q.token.as_deref().unwrap_or_default()))
}

#[instrument(skip(state, form))]
pub async fn reset_password(
    State(state): State<AccountsState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let (Some(token), Some(password)) = (form.token, form.password) else {
        return (StatusCode::BAD_REQUEST, "Token and password are required.").into_response();
    };
    if password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Token and password are required.").into_response();
    }

    let keys = ResetKeys::from_ref(&state);
    let email = match keys.verify(&token) {
        Ok(email) => email,
        Err(e) => {
            warn!(error = %e, "reset token rejected");
            return INVALID_TOKEN.into_response();
        }
    };

    let hash = match hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Password reset failed.").into_response();
        }
    };

    match User::update_password_hash(&state.db, &email, &hash).await {
        Ok(0) => {
            warn!(email = %email, "reset for unknown account");
            (StatusCode::NOT_FOUND, "No account matches this reset link.").into_response()
        }
        Ok(_) => {
            info!(email = %email, "password reset");
            "Password reset successful! You can close this page and log in.".into_response()
        }
        Err(e) => {
            error!(error = %e, "update_password_hash failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Password reset failed.").into_response()
        }
    }
}
