//! # Settings
//!
//! Process configuration, built once at start-up and passed by reference to
//! whatever needs it. Values come from environment variables (the server loads
//! `.env` first).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::github::GITHUB_GRAPHQL_URL;
use crate::models::{AgentModels, LlmProvider};
use crate::reasoning::ResilienceConfig;
use crate::skills::tools::script_tools::ScriptConfig;
use crate::swarm::CoordinatorConfig;

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Provider and model per agent
    pub models: AgentModels,
    /// GitHub GraphQL endpoint
    pub github_graphql_url: String,
    /// Timeout for each GitHub request
    pub github_timeout: Duration,
    /// Root of the statically served directory datasets are written to
    pub public_dir: PathBuf,
    /// Directory generated chart components are written to
    pub charts_dir: PathBuf,
    /// Hop and wall-clock budgets of a run
    pub coordinator: CoordinatorConfig,
    /// Per-call timeout and malformed-output retries
    pub resilience: ResilienceConfig,
    /// Interpreter behind the developer's `run_script` tool
    pub script: ScriptConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models: AgentModels::default(),
            github_graphql_url: GITHUB_GRAPHQL_URL.to_string(),
            github_timeout: Duration::from_secs(30),
            public_dir: PathBuf::from("public"),
            charts_dir: PathBuf::from("charts"),
            coordinator: CoordinatorConfig::default(),
            resilience: ResilienceConfig::default(),
            script: ScriptConfig::default(),
        }
    }
}

impl Settings {
    /// Build settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(provider) = var("REPOCHART_PROVIDER") {
            let provider = LlmProvider::from_str(&provider).map_err(anyhow::Error::msg)?;
            settings.models = AgentModels::for_provider(provider);
        }
        if let Some(model) = var("REPOCHART_MODEL") {
            settings.models.model = model;
        }
        if let Some(model) = var("REPOCHART_SUPERVISOR_MODEL") {
            settings.models.router_model = model;
        }
        settings.models.base_url = var("REPOCHART_BASE_URL");

        if let Some(url) = var("GITHUB_GRAPHQL_URL") {
            settings.github_graphql_url = url;
        }
        if let Some(dir) = var("REPOCHART_PUBLIC_DIR") {
            settings.public_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("REPOCHART_CHARTS_DIR") {
            settings.charts_dir = PathBuf::from(dir);
        }
        if let Some(hops) = var("REPOCHART_MAX_HOPS") {
            settings.coordinator.max_hops = parse(&hops, "REPOCHART_MAX_HOPS")?;
        }
        if let Some(secs) = var("REPOCHART_RUN_TIMEOUT_SECS") {
            settings.coordinator.run_timeout =
                Duration::from_secs(parse(&secs, "REPOCHART_RUN_TIMEOUT_SECS")?);
        }
        if let Some(secs) = var("REPOCHART_CALL_TIMEOUT_SECS") {
            settings.resilience.call_timeout =
                Duration::from_secs(parse(&secs, "REPOCHART_CALL_TIMEOUT_SECS")?);
        }
        if let Some(retries) = var("REPOCHART_OUTPUT_RETRIES") {
            settings.resilience.output_retries = parse(&retries, "REPOCHART_OUTPUT_RETRIES")?;
        }
        if let Some(interpreter) = var("REPOCHART_SCRIPT_INTERPRETER") {
            settings.script.interpreter = interpreter;
        }

        if settings.coordinator.max_hops == 0 {
            anyhow::bail!("REPOCHART_MAX_HOPS must be at least 1");
        }

        Ok(settings)
    }

    /// Shared HTTP client for GitHub calls (connection pool reused across runs)
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.github_timeout)
            .build()
            .context("Failed to build HTTP client")
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} has an invalid value: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.models.provider, LlmProvider::OpenAI);
        assert_eq!(settings.github_graphql_url, GITHUB_GRAPHQL_URL);
        assert_eq!(settings.coordinator.max_hops, 12);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("REPOCHART_PROVIDER", "anthropic"),
            ("REPOCHART_SUPERVISOR_MODEL", "claude-3-haiku-20240307"),
            ("REPOCHART_MAX_HOPS", "20"),
            ("REPOCHART_RUN_TIMEOUT_SECS", "30"),
            ("REPOCHART_PUBLIC_DIR", "/srv/www"),
        ])
        .unwrap();

        assert_eq!(settings.models.provider, LlmProvider::Anthropic);
        assert_eq!(settings.models.router_model, "claude-3-haiku-20240307");
        assert_eq!(settings.coordinator.max_hops, 20);
        assert_eq!(settings.coordinator.run_timeout, Duration::from_secs(30));
        assert_eq!(settings.public_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(settings(&[("REPOCHART_MAX_HOPS", "many")]).is_err());
        assert!(settings(&[("REPOCHART_MAX_HOPS", "0")]).is_err());
        assert!(settings(&[("REPOCHART_PROVIDER", "azure-ish")]).is_err());
    }
}
