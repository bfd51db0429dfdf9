//! Error taxonomy shared by both services
//!
//! Every rejected request carries a machine-readable tag plus a
//! human-readable reason. Dependency failures during settlement/refund are
//! handled per-beneficiary inside the bet service and never surface through
//! this type for those paths; they only appear here when the whole operation
//! must abort (e.g. the debit during bet placement).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Bad input shape or range (non-positive amount, invalid option,
    /// self-transfer).
    Validation(String),
    /// Unknown account/event, or event no longer accepting the transition.
    NotFound(String),
    /// Duplicate wager or a terminal transition that already happened.
    Conflict(String),
    /// Admission-control balance check failed.
    InsufficientFunds(String),
    /// A downstream ledger/store call failed or timed out.
    Dependency(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn tag(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::InsufficientFunds(_) => "insufficient_funds",
            ApiError::Dependency(_) => "dependency_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InsufficientFunds(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Dependency(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": self.tag(),
            "message": message,
        }));

        (status, body).into_response()
    }
}
