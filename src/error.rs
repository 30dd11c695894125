use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failure taxonomy. Every variant renders the
/// `{error, message}` JSON shape; nothing beyond the error's string form
/// is exposed to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("weak password")]
    WeakPassword(Vec<String>),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid todo id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::WeakPassword(_)
            | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(msg) => json!({ "error": "Validation error", "message": msg }),
            Self::Conflict(msg) => json!({ "error": "Conflict", "message": msg }),
            Self::WeakPassword(rules) => json!({
                "error": "Weak Password",
                "message": "Password does not meet the strength policy",
                "details": rules,
            }),
            Self::Auth(msg) => json!({ "error": "Unauthorized", "message": msg }),
            Self::NotFound(msg) => json!({ "error": "Not found", "message": msg }),
            Self::InvalidId(msg) => json!({ "error": "Invalid todo ID", "message": msg }),
            Self::Internal(err) => {
                error!(error = %err, "internal error");
                json!({ "error": "Internal server error", "message": err.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Internal(e.into())
    }
}
