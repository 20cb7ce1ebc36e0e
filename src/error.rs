use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("admin privileges required")]
    Forbidden,

    #[error("insufficient funds: balance {balance}, price {price}")]
    InsufficientFunds { balance: i64, price: i64 },

    #[error("item already owned")]
    AlreadyOwned,

    #[error("item is not in the inventory")]
    NotOwned,

    #[error("user already exists")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("reward already claimed")]
    RewardClaimed,

    #[error("too many login attempts")]
    TooManyRequests,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed")]
    PasswordHash,
}

impl PortalError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            PortalError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            PortalError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PortalError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            PortalError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            PortalError::InsufficientFunds { .. } => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS")
            }
            PortalError::AlreadyOwned => (StatusCode::BAD_REQUEST, "ALREADY_OWNED"),
            PortalError::NotOwned => (StatusCode::BAD_REQUEST, "NOT_OWNED"),
            PortalError::EmailTaken => (StatusCode::BAD_REQUEST, "EMAIL_TAKEN"),
            PortalError::InvalidCredentials => (StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS"),
            PortalError::RewardClaimed => (StatusCode::BAD_REQUEST, "REWARD_CLAIMED"),
            PortalError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT"),
            PortalError::DatabaseError(_)
            | PortalError::JsonError(_)
            | PortalError::TokenError(_)
            | PortalError::PasswordHash => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Maps a unique-constraint violation to `conflict`, passing every other error through.
    pub(crate) fn on_unique_violation(err: SqlxError, conflict: PortalError) -> PortalError {
        if let SqlxError::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return conflict;
        }
        PortalError::DatabaseError(err)
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };
        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
