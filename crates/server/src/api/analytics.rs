//! # Analytics API
//!
//! Chart generation for a GitHub repository.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use repochart_core::ChartRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{ApiError, ErrorResponse};
use crate::SharedState;

/// Header carrying the caller's GitHub token
pub const TOKEN_HEADER: &str = "x-gh-pat";

/// Chart request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyticsRequest {
    /// What the chart should show
    pub message: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl From<AnalyticsRequest> for ChartRequest {
    fn from(req: AnalyticsRequest) -> Self {
        ChartRequest {
            message: req.message,
            owner: req.owner,
            repo: req.repo,
        }
    }
}

/// Generated chart component
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    /// TypeScript source of the chart
    pub code: String,
    pub explanation: String,
}

pub fn analytics_routes() -> Router<SharedState> {
    Router::new().route("/analytics", post(generate_chart))
}

/// Read the GitHub token from the request headers
pub fn github_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(format!("missing {} header", TOKEN_HEADER)))
}

/// Generate a chart for a repository
#[utoipa::path(
    post,
    path = "/v1/analytics",
    tag = "analytics",
    request_body = AnalyticsRequest,
    params(
        ("x-gh-pat" = String, Header, description = "GitHub token used to read the repository")
    ),
    responses(
        (status = 200, description = "Chart generated", body = AnalyticsResponse),
        (status = 400, description = "Missing token or invalid fields", body = ErrorResponse),
        (status = 422, description = "The chart could not be built", body = ErrorResponse),
        (status = 500, description = "Internal failure", body = ErrorResponse),
        (status = 504, description = "Run budget exceeded", body = ErrorResponse)
    )
)]
pub async fn generate_chart(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<AnalyticsRequest>, JsonRejection>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let token = github_token(&headers)?;
    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = ChartRequest::from(req);

    tracing::info!(owner = %request.owner, repo = %request.repo, "Chart requested");
    let response = state.service.generate(request, &token).await?;

    Ok(Json(AnalyticsResponse {
        code: response.code,
        explanation: response.explanation,
    }))
}
