//! # Reasoning Service
//!
//! The boundary to the language model. A worker hands over a prompt, its
//! callable tools and the output tool it must commit through; the service
//! returns a payload already validated against that tool's schema.
//!
//! - [`RadkitReasoning`] talks to a real provider through radkit.
//! - [`ResilientReasoning`] wraps any service with a per-call timeout and
//!   retries for malformed output.

pub mod radkit_service;

use async_trait::async_trait;
use radkit::models::BaseLlm;
use radkit::tools::FunctionTool;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::{ChartError, Result};
use crate::skills::tools::{OutputTool, ToolSpec};
use crate::state::Message;

pub use radkit_service::RadkitReasoning;

/// One reasoning call
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    /// Agent id, used for model selection and logs
    pub agent: &'static str,
    pub system_prompt: &'static str,
    /// Prior conversation, oldest first
    pub history: Vec<Message>,
    /// Task for this call
    pub input: String,
    /// Tools the model may call before committing its output
    pub tools: Vec<ToolSpec>,
}

impl ReasoningRequest {
    pub fn new(agent: &'static str, system_prompt: &'static str, input: impl Into<String>) -> Self {
        Self {
            agent,
            system_prompt,
            history: Vec::new(),
            input: input.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolSpec>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Render history and task into the single user turn sent to the model
    pub fn transcript(&self) -> String {
        if self.history.is_empty() {
            return self.input.clone();
        }

        let mut out = String::from("## Conversation so far\n");
        for message in &self.history {
            out.push_str(&format!("[{}] {}\n", message.role, message.content));
        }
        out.push_str("\n## Task\n");
        out.push_str(&self.input);
        out
    }
}

/// A payload a reasoning call can be forced to produce.
///
/// Implemented for each output-commit payload with
/// [`impl_structured_output!`](crate::impl_structured_output).
#[async_trait]
pub trait StructuredOutput: Serialize + DeserializeOwned + JsonSchema + Send + Sync + 'static {
    /// Run a radkit tool loop that ends in `Self`
    async fn run_worker<L>(
        llm: L,
        system_prompt: &'static str,
        input: String,
        tools: Vec<FunctionTool>,
    ) -> anyhow::Result<Self>
    where
        L: BaseLlm + Send + Sync + 'static;
}

/// Implement [`StructuredOutput`] for concrete `LLMOutput` types.
///
/// `LlmWorker` needs a concrete output type, so the builder is instantiated
/// once per payload.
#[macro_export]
macro_rules! impl_structured_output {
    ($($output_type:ty),* $(,)?) => {
        $(
            #[async_trait::async_trait]
            impl $crate::reasoning::StructuredOutput for $output_type {
                async fn run_worker<L>(
                    llm: L,
                    system_prompt: &'static str,
                    input: String,
                    tools: Vec<radkit::tools::FunctionTool>,
                ) -> anyhow::Result<Self>
                where
                    L: radkit::models::BaseLlm + Send + Sync + 'static,
                {
                    let mut builder = radkit::agent::LlmWorker::<$output_type>::builder(llm)
                        .with_system_instructions(system_prompt);
                    for tool in tools {
                        builder = builder.with_tool(tool);
                    }
                    let output = builder.build().run(input).await?;
                    Ok(output)
                }
            }
        )*
    };
}

impl_structured_output!(
    crate::state::TechnicalPlanPayload,
    crate::state::DatasetPayload,
    crate::state::DeveloperOutput,
    crate::skills::RouteDecision,
);

/// Boundary to the language model
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Run one reasoning loop that must end by committing through `output`
    async fn invoke<T: StructuredOutput>(
        &self,
        request: ReasoningRequest,
        output: &OutputTool<T>,
    ) -> Result<T>;
}

#[async_trait]
impl<S: ReasoningService> ReasoningService for std::sync::Arc<S> {
    async fn invoke<T: StructuredOutput>(
        &self,
        request: ReasoningRequest,
        output: &OutputTool<T>,
    ) -> Result<T> {
        (**self).invoke(request, output).await
    }
}

/// Timeout and retry policy for reasoning calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResilienceConfig {
    /// Budget for a single attempt
    pub call_timeout: Duration,
    /// Extra attempts after a malformed output
    pub output_retries: u32,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(120),
            output_retries: 2,
        }
    }
}

/// Applies [`ResilienceConfig`] around another service.
///
/// Only `MalformedOutput` is retried; transport errors and timeouts surface
/// immediately.
#[derive(Debug, Clone)]
pub struct ResilientReasoning<S> {
    inner: S,
    config: ResilienceConfig,
}

impl<S> ResilientReasoning<S> {
    pub fn new(inner: S, config: ResilienceConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<S: ReasoningService> ReasoningService for ResilientReasoning<S> {
    async fn invoke<T: StructuredOutput>(
        &self,
        request: ReasoningRequest,
        output: &OutputTool<T>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            let call = self.inner.invoke(request.clone(), output);
            let result = match tokio::time::timeout(self.config.call_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ChartError::Timeout(format!(
                    "{} did not answer within {}s",
                    request.agent,
                    self.config.call_timeout.as_secs()
                ))),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.config.output_retries => {
                    attempt += 1;
                    tracing::warn!(
                        agent = request.agent,
                        attempt,
                        error = %e,
                        "Malformed output, retrying"
                    );
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::outputs::DeveloperOutput;
    use crate::state::Role;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const CODE_OUTPUT: OutputTool<DeveloperOutput> =
        OutputTool::new("create_developer_output", "Emit the chart component");

    /// Fails `failures` times with the given error, then answers
    struct Flaky {
        failures: u32,
        error: ChartError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ReasoningService for Flaky {
        async fn invoke<T: StructuredOutput>(
            &self,
            _request: ReasoningRequest,
            output: &OutputTool<T>,
        ) -> Result<T> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(self.error.clone());
            }
            output.commit(json!({ "typescript_code": "export default () => null;" }))
        }
    }

    struct Hanging;

    #[async_trait]
    impl ReasoningService for Hanging {
        async fn invoke<T: StructuredOutput>(
            &self,
            _request: ReasoningRequest,
            _output: &OutputTool<T>,
        ) -> Result<T> {
            std::future::pending().await
        }
    }

    fn flaky(failures: u32, error: ChartError) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures,
            error,
            calls: AtomicU32::new(0),
        })
    }

    fn request() -> ReasoningRequest {
        ReasoningRequest::new("developer", "You write charts.", "Draw it")
    }

    #[tokio::test]
    async fn test_retries_malformed_output() {
        let flaky = flaky(2, ChartError::malformed("not json"));
        let service = ResilientReasoning::new(Arc::clone(&flaky), ResilienceConfig::default());

        let output = service.invoke(request(), &CODE_OUTPUT).await.unwrap();
        assert_eq!(output.code, "export default () => null;");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_budget() {
        let flaky = flaky(5, ChartError::malformed("not json"));
        let service = ResilientReasoning::new(
            Arc::clone(&flaky),
            ResilienceConfig {
                output_retries: 1,
                ..ResilienceConfig::default()
            },
        );

        let err = service.invoke(request(), &CODE_OUTPUT).await.unwrap_err();
        assert!(matches!(err, ChartError::MalformedOutput(_)));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_does_not_retry_transport_errors() {
        let flaky = flaky(1, ChartError::reasoning("connection reset"));
        let service = ResilientReasoning::new(Arc::clone(&flaky), ResilienceConfig::default());

        let err = service.invoke(request(), &CODE_OUTPUT).await.unwrap_err();
        assert!(matches!(err, ChartError::Reasoning(_)));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout() {
        let service = ResilientReasoning::new(
            Hanging,
            ResilienceConfig {
                call_timeout: Duration::from_secs(5),
                output_retries: 0,
            },
        );

        let err = service.invoke(request(), &CODE_OUTPUT).await.unwrap_err();
        assert!(matches!(err, ChartError::Timeout(_)));
    }

    #[test]
    fn test_transcript_includes_history() {
        let request = request().with_history(vec![
            Message::new(Role::User, "Plot commits per day"),
            Message::new(Role::Planner, "{\"requirements\":[]}"),
        ]);

        let transcript = request.transcript();
        assert!(transcript.starts_with("## Conversation so far"));
        assert!(transcript.contains("[user] Plot commits per day"));
        assert!(transcript.contains("[planner]"));
        assert!(transcript.ends_with("Draw it"));
    }
}
