//! # Models
//!
//! LLM provider and model selection for the reasoning service.
//!
//! API keys are never stored here: each radkit provider reads its key from the
//! environment (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...) when the client is
//! built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    OpenRouter,
    Grok,
    DeepSeek,
}

impl LlmProvider {
    /// Display name for logs
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Grok => "Grok",
            LlmProvider::DeepSeek => "DeepSeek",
        }
    }

    /// Whether this provider supports custom base URL
    pub fn supports_base_url(&self) -> bool {
        matches!(self, LlmProvider::OpenAI)
    }

    /// Model used for the workers when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Gemini => "gemini-2.0-flash-exp",
            LlmProvider::OpenRouter => "openai/gpt-4o",
            LlmProvider::Grok => "grok-2",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }

    /// Cheaper model used for routing when none is configured
    pub fn default_router_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-3-5-haiku-20241022",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::OpenRouter => "openai/gpt-4o-mini",
            other => other.default_model(),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(LlmProvider::Anthropic),
            "openai" => Ok(LlmProvider::OpenAI),
            "gemini" => Ok(LlmProvider::Gemini),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "grok" => Ok(LlmProvider::Grok),
            "deepseek" => Ok(LlmProvider::DeepSeek),
            other => Err(format!("unknown LLM provider '{}'", other)),
        }
    }
}

/// Provider and model for one agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "gpt-4o", "claude-sonnet-4-20250514")
    pub model: String,
    /// Optional base URL override for OpenAI-compatible APIs
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::with_provider(LlmProvider::default(), LlmProvider::default().default_model())
    }
}

impl ModelConfig {
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
        }
    }
}

/// Model selection for every agent of the team
///
/// Lookup order: per-agent override, then the router model for the
/// supervisor, then the global model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentModels {
    pub provider: LlmProvider,
    pub model: String,
    pub router_model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub per_agent_models: HashMap<String, String>,
}

impl Default for AgentModels {
    fn default() -> Self {
        Self::for_provider(LlmProvider::default())
    }
}

impl AgentModels {
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            router_model: provider.default_router_model().to_string(),
            base_url: None,
            per_agent_models: HashMap::new(),
        }
    }

    /// Resolve the model config for one agent
    pub fn model_config(&self, agent_id: &str) -> ModelConfig {
        let model = self
            .per_agent_models
            .get(agent_id)
            .cloned()
            .unwrap_or_else(|| {
                if agent_id == "supervisor" {
                    self.router_model.clone()
                } else {
                    self.model.clone()
                }
            });

        let base_url = if self.provider.supports_base_url() {
            self.base_url.clone()
        } else {
            None
        };

        ModelConfig {
            provider: self.provider,
            model,
            base_url,
        }
    }
}
