//! # API Errors
//!
//! Maps the core error taxonomy onto HTTP statuses. Only messages meant for
//! the caller cross the boundary; internal failures are logged and replaced
//! by a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use repochart_core::ChartError;
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned for internal failures
pub const GENERIC_FAILURE: &str = "chart generation failed";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error response with its status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        let status = match &err {
            ChartError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChartError::RunBudgetExceeded(_) | ChartError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            e if e.is_fatal() => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let message = match err {
            ChartError::WorkerReported(reason) => reason,
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %e, "Chart generation failed");
                GENERIC_FAILURE.to_string()
            }
            e => e.to_string(),
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_reported_is_verbatim() {
        let err = ApiError::from(ChartError::WorkerReported("Stars are not available".into()));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "Stars are not available");
    }

    #[test]
    fn test_internal_errors_are_hidden() {
        let err = ApiError::from(ChartError::reasoning("401 Unauthorized: sk-..."));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, GENERIC_FAILURE);

        let err = ApiError::from(ChartError::Precondition {
            worker: "developer",
            missing: "plan_output",
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ChartError::invalid_request("owner is empty")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ChartError::RunBudgetExceeded("12 hops".into())).status,
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(ChartError::Timeout("planner".into())).status,
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(ChartError::EmptyDataset("acme/widgets".into())).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
