//! Radkit-backed reasoning service.
//!
//! `LlmWorker::builder()` requires a concrete type implementing `BaseLlm`,
//! not a boxed trait object, so the provider is matched once here and the
//! concrete client handed to [`StructuredOutput::run_worker`].

use async_trait::async_trait;
use radkit::models::providers::{
    AnthropicLlm, DeepSeekLlm, GeminiLlm, GrokLlm, OpenAILlm, OpenRouterLlm,
};
use radkit::tools::{FunctionTool, ToolResult};

use super::{ReasoningRequest, ReasoningService, StructuredOutput};
use crate::error::{ChartError, Result};
use crate::models::{AgentModels, LlmProvider, ModelConfig};
use crate::skills::tools::{OutputTool, ToolSpec};

/// Error fragments radkit uses when the model reply does not fit the output type
const MALFORMED_MARKERS: [&str; 5] = ["parse", "json", "schema", "deserializ", "structured output"];

/// Reasoning service calling the configured provider
#[derive(Debug, Clone)]
pub struct RadkitReasoning {
    models: AgentModels,
}

impl RadkitReasoning {
    pub fn new(models: AgentModels) -> Self {
        Self { models }
    }
}

#[async_trait]
impl ReasoningService for RadkitReasoning {
    async fn invoke<T: StructuredOutput>(
        &self,
        request: ReasoningRequest,
        output: &OutputTool<T>,
    ) -> Result<T> {
        let config = self.models.model_config(request.agent);
        let input = format!("{}\n\n{}", request.transcript(), commit_instruction(output));
        let tools = request.tools.iter().map(to_function_tool).collect();

        tracing::debug!(
            agent = request.agent,
            provider = config.provider.display_name(),
            model = %config.model,
            tools = request.tools.len(),
            "Invoking reasoning service"
        );

        run_provider::<T>(&config, request.system_prompt, input, tools)
            .await
            .map_err(|e| classify(request.agent, e))
    }
}

async fn run_provider<T: StructuredOutput>(
    config: &ModelConfig,
    system_prompt: &'static str,
    input: String,
    tools: Vec<FunctionTool>,
) -> anyhow::Result<T> {
    match config.provider {
        LlmProvider::Anthropic => {
            let llm = AnthropicLlm::from_env(&config.model).map_err(client_error)?;
            T::run_worker(llm, system_prompt, input, tools).await
        }
        LlmProvider::OpenAI => {
            let mut llm = OpenAILlm::from_env(&config.model).map_err(client_error)?;
            if let Some(base_url) = &config.base_url {
                llm = llm.with_base_url(base_url);
            }
            T::run_worker(llm, system_prompt, input, tools).await
        }
        LlmProvider::Gemini => {
            let llm = GeminiLlm::from_env(&config.model).map_err(client_error)?;
            T::run_worker(llm, system_prompt, input, tools).await
        }
        LlmProvider::OpenRouter => {
            let llm = OpenRouterLlm::from_env(&config.model).map_err(client_error)?;
            T::run_worker(llm, system_prompt, input, tools).await
        }
        LlmProvider::Grok => {
            let llm = GrokLlm::from_env(&config.model).map_err(client_error)?;
            T::run_worker(llm, system_prompt, input, tools).await
        }
        LlmProvider::DeepSeek => {
            let llm = DeepSeekLlm::from_env(&config.model).map_err(client_error)?;
            T::run_worker(llm, system_prompt, input, tools).await
        }
    }
}

/// Client construction failures (usually a missing API key) are configuration errors
fn client_error<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow::Error::new(ChartError::Config(e.to_string()))
}

/// Map a radkit failure onto the error taxonomy
fn classify(agent: &str, error: anyhow::Error) -> ChartError {
    if let Some(chart_error) = error.downcast_ref::<ChartError>() {
        return chart_error.clone();
    }

    let message = format!("{:#}", error);
    let lower = message.to_lowercase();
    if MALFORMED_MARKERS.iter().any(|marker| lower.contains(marker)) {
        ChartError::malformed(format!("{}: {}", agent, message))
    } else {
        ChartError::reasoning(format!("{}: {}", agent, message))
    }
}

/// Closing instruction naming the payload and the schema it must match
fn commit_instruction<T: StructuredOutput>(output: &OutputTool<T>) -> String {
    format!(
        "Finish by emitting the `{}` payload: {}\nIts JSON schema: {}",
        output.name(),
        output.description(),
        output.schema()
    )
}

/// Expose a tool to radkit; handler errors go back to the model as tool errors
fn to_function_tool(spec: &ToolSpec) -> FunctionTool {
    let parameters = spec.parameters.clone();
    let spec = spec.clone();
    FunctionTool::new(spec.name, spec.description, move |args, _ctx| {
        let spec = spec.clone();
        Box::pin(async move {
            let args = match serde_json::to_value(&args) {
                Ok(args) => args,
                Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
            };
            match spec.call(args).await {
                Ok(value) => ToolResult::success(value),
                Err(e) => {
                    tracing::warn!(tool = spec.name, error = %e, "Tool call failed");
                    ToolResult::error(e.to_string())
                }
            }
        })
    })
    .with_parameters_schema(parameters)
}
