use axum::http::StatusCode;
use tracing::error;

/// Failure taxonomy shared by both services. Each service renders it in its
/// own response body shape.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ToolMissing(String),
    #[error("{0}")]
    Timeout(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ToolMissing(_) | ApiError::Timeout(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand to a client. Internal failures are logged here and
    /// replaced by `fallback`.
    pub fn client_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Internal(e) => {
                error!(error = %format!("{e:#}"), "internal error");
                fallback.to_string()
            }
            other => other.to_string(),
        }
    }
}
