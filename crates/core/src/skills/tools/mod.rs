//! # Tools
//!
//! Schema-described functions a worker may hand to the reasoning service.
//!
//! - `github_tools` - the three data-fetch tools
//! - `output_tools` - output-commit tools forcing a structured payload
//! - `script_tools` - the developer's `run_script` scratchpad

pub mod github_tools;
pub mod output_tools;
pub mod script_tools;

use futures::future::{BoxFuture, FutureExt};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::error::{ChartError, Result};

pub use github_tools::{data_tools, FetchLog, COMMITS_TOOL, ISSUES_TOOL, PULL_REQUESTS_TOOL};
pub use output_tools::OutputTool;
pub use script_tools::{run_script_tool, ScriptConfig};

type ToolHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// A callable tool: name, description, argument schema and async handler
#[derive(Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments
    pub parameters: Value,
    handler: ToolHandler,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl ToolSpec {
    /// Build a tool whose arguments deserialize into `A`
    pub fn new<A, F, Fut>(name: &'static str, description: &'static str, handler: F) -> Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let inner = Arc::new(handler);
        let handler: ToolHandler = Arc::new(move |args: Value| {
            let inner = Arc::clone(&inner);
            async move {
                let args: A = serde_json::from_value(args).map_err(|e| {
                    ChartError::malformed(format!("invalid arguments for {}: {}", name, e))
                })?;
                (*inner)(args).await
            }
            .boxed()
        });

        Self {
            name,
            description,
            parameters: serde_json::to_value(schemars::schema_for!(A)).unwrap_or_default(),
            handler,
        }
    }

    /// Run the handler with raw JSON arguments
    pub async fn call(&self, args: Value) -> Result<Value> {
        (self.handler)(args).await
    }
}
