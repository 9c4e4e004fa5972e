//! # Errors
//!
//! Unified error type for orchestration runs.
//!
//! Fatal errors abort the run and surface to the caller. Data errors raised
//! inside the analyst (`UpstreamData`, `DataFetch`, `EmptyDataset`) are
//! converted into the context's `error_message` instead, so the supervisor can
//! finish gracefully.

use thiserror::Error;

/// Result type for RepoChart core operations
pub type Result<T> = std::result::Result<T, ChartError>;

/// Unified error type for the orchestration core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Transport or authentication failure talking to the reasoning service
    #[error("reasoning service error: {0}")]
    Reasoning(String),

    /// Model output did not validate against the expected schema
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// The data-fetch collaborator returned a shape violating its contract
    #[error("upstream data error: {0}")]
    UpstreamData(String),

    /// The data-fetch request itself failed (network, HTTP status, GraphQL errors)
    #[error("data fetch failed: {0}")]
    DataFetch(String),

    /// The analyst's tool loop produced zero records
    #[error("empty dataset: no records were fetched for {0}")]
    EmptyDataset(String),

    /// A worker ran before the outputs it depends on existed
    #[error("{worker} cannot run: missing {missing}")]
    Precondition {
        worker: &'static str,
        missing: &'static str,
    },

    /// The run exceeded its hop or wall-clock budget
    #[error("run budget exceeded: {0}")]
    RunBudgetExceeded(String),

    /// A single external call exceeded its timeout
    #[error("timed out: {0}")]
    Timeout(String),

    /// A worker or the supervisor judged the task infeasible
    #[error("{0}")]
    WorkerReported(String),

    /// Dataset or artifact persistence failed
    #[error("storage error: {0}")]
    Storage(String),

    /// The request itself is invalid
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ChartError {
    /// Create a reasoning service error
    pub fn reasoning(msg: impl Into<String>) -> Self {
        ChartError::Reasoning(msg.into())
    }

    /// Create a malformed output error
    pub fn malformed(msg: impl Into<String>) -> Self {
        ChartError::MalformedOutput(msg.into())
    }

    /// Create an upstream data error
    pub fn upstream(msg: impl Into<String>) -> Self {
        ChartError::UpstreamData(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        ChartError::Storage(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ChartError::InvalidRequest(msg.into())
    }

    /// Whether the analyst converts this error into an `error_message`
    /// instead of aborting the run.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ChartError::UpstreamData(_) | ChartError::DataFetch(_) | ChartError::EmptyDataset(_)
        )
    }

    /// Whether the error may succeed on another attempt of the same call
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChartError::MalformedOutput(_))
    }

    /// Whether the error is an internal failure rather than something the
    /// caller can act on (a bad request or a reported reason)
    pub fn is_fatal(&self) -> bool {
        !self.is_data_error()
            && !matches!(
                self,
                ChartError::WorkerReported(_) | ChartError::InvalidRequest(_)
            )
    }
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ChartError {
    fn from(err: std::io::Error) -> Self {
        ChartError::Storage(err.to_string())
    }
}
