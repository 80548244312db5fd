//! Error taxonomy shared by every pricing component
//!
//! Handlers map each variant onto an HTTP status; the sweeper only logs them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    /// Malformed or out-of-range input (negative price, past effective time, bad settings)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is not valid in the current state (cancel or re-apply of an applied change)
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// Reference price feed failed or timed out
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Storage-layer failure
    #[error("internal error: {0}")]
    Internal(String),
}

pub type PricingResult<T> = Result<T, PricingError>;

impl PricingError {
    pub fn item_not_found(item_id: &str) -> Self {
        PricingError::NotFound(format!("priced item '{}'", item_id))
    }

    pub fn change_not_found(change_id: i64) -> Self {
        PricingError::NotFound(format!("scheduled change {}", change_id))
    }

    pub fn code(&self) -> &'static str {
        match self {
            PricingError::InvalidArgument(_) => "INVALID_ARGUMENT",
            PricingError::NotFound(_) => "NOT_FOUND",
            PricingError::FailedPrecondition(_) => "FAILED_PRECONDITION",
            PricingError::Unavailable(_) => "UNAVAILABLE",
            PricingError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PricingError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            PricingError::NotFound(_) => StatusCode::NOT_FOUND,
            PricingError::FailedPrecondition(_) => StatusCode::CONFLICT,
            PricingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PricingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for PricingError {
    fn from(err: DbErr) -> Self {
        PricingError::Internal(format!("Database error: {}", err))
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code: self.code().to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PricingError::InvalidArgument("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PricingError::item_not_found("m1").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            PricingError::FailedPrecondition("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PricingError::Unavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_db_error_is_internal() {
        let err: PricingError = DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.code(), "INTERNAL");
        assert!(err.to_string().contains("boom"));
    }
}
