//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use yieldcap_core::money::format_cents;
use yieldcap_core::LedgerError;
use yieldcap_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Login rejected; the same message covers unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Deposit amount outside the accepted range.
    #[error("{message}")]
    DepositRejected {
        /// Human-readable reason.
        message: String,
        /// Requested amount in cents.
        amount_cents: i64,
        /// The limit that was violated, in cents.
        limit_cents: i64,
    },

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized | Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::DepositRejected {
                message,
                amount_cents,
                limit_cents,
            } => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                message.clone(),
                Some(serde_json::json!({
                    "amount": format_cents(*amount_cents),
                    "limit": format_cents(*limit_cents)
                })),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DepositBelowMinimum {
                amount_cents,
                minimum_cents,
            } => Self::DepositRejected {
                message: format!("Minimum deposit is {}", format_cents(minimum_cents)),
                amount_cents,
                limit_cents: minimum_cents,
            },
            LedgerError::DepositAboveMaximum {
                amount_cents,
                maximum_cents,
            } => Self::DepositRejected {
                message: format!("Maximum deposit is {}", format_cents(maximum_cents)),
                amount_cents,
                limit_cents: maximum_cents,
            },
            LedgerError::InvalidReferralCode(_) => Self::BadRequest("Invalid referral code".into()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::InvalidReferralCode(_) => Self::BadRequest("Invalid referral code".into()),
            StoreError::EmailTaken(_) => Self::BadRequest("User already exists".into()),
            StoreError::Ledger(err) => err.into(),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
