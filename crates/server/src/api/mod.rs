//! HTTP API handlers

pub mod analytics;
pub mod error;

pub use analytics::analytics_routes;
pub use error::{ApiError, ErrorResponse};
