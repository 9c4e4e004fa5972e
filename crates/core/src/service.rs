//! # Chart Service
//!
//! Entry point of the core: one request in, chart code out. Builds the
//! per-request collaborators, runs the coordinator and persists the
//! component.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Settings;
use crate::error::{ChartError, Result};
use crate::github::{GithubClient, RepoDataSource};
use crate::reasoning::{RadkitReasoning, ReasoningService, ResilientReasoning};
use crate::skills::create_team;
use crate::skills::tools::ScriptConfig;
use crate::state::{
    ArtifactStore, DatasetStore, FsArtifactStore, FsDatasetStore, RepoKey, SharedContext,
};
use crate::swarm::{Coordinator, CoordinatorConfig, RunOutcome};

/// Builds a data source authenticated with the caller's GitHub token
pub type SourceFactory = Arc<dyn Fn(&str) -> Arc<dyn RepoDataSource> + Send + Sync>;

/// A chart request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartRequest {
    /// What the chart should show
    pub message: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl ChartRequest {
    /// Check the fields and derive the storage key
    pub fn validate(&self) -> Result<RepoKey> {
        if self.message.trim().is_empty() {
            return Err(ChartError::invalid_request("message is empty"));
        }
        RepoKey::new(self.owner.trim(), self.repo.trim())
    }
}

/// Generated chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartResponse {
    /// TypeScript source of the chart component
    pub code: String,
    /// What the component does
    pub explanation: String,
}

/// Runs chart requests; shared by every request of the process
pub struct ChartService<S> {
    reasoning: Arc<S>,
    sources: SourceFactory,
    datasets: Arc<dyn DatasetStore>,
    artifacts: Arc<dyn ArtifactStore>,
    coordinator: CoordinatorConfig,
    script: ScriptConfig,
}

impl ChartService<ResilientReasoning<RadkitReasoning>> {
    /// Wire the production collaborators from settings
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = settings.http_client()?;
        let url = settings.github_graphql_url.clone();
        let sources: SourceFactory = Arc::new(move |token: &str| {
            Arc::new(GithubClient::new(http.clone(), url.clone(), token)) as Arc<dyn RepoDataSource>
        });

        let reasoning = ResilientReasoning::new(
            RadkitReasoning::new(settings.models.clone()),
            settings.resilience,
        );

        tracing::info!(
            provider = settings.models.provider.display_name(),
            model = %settings.models.model,
            router_model = %settings.models.router_model,
            "Chart service configured"
        );

        Ok(Self::new(
            Arc::new(reasoning),
            sources,
            Arc::new(FsDatasetStore::new(&settings.public_dir)),
            Arc::new(FsArtifactStore::new(&settings.charts_dir)),
            settings.coordinator,
            settings.script.clone(),
        ))
    }
}

impl<S: ReasoningService + 'static> ChartService<S> {
    pub fn new(
        reasoning: Arc<S>,
        sources: SourceFactory,
        datasets: Arc<dyn DatasetStore>,
        artifacts: Arc<dyn ArtifactStore>,
        coordinator: CoordinatorConfig,
        script: ScriptConfig,
    ) -> Self {
        Self {
            reasoning,
            sources,
            datasets,
            artifacts,
            coordinator,
            script,
        }
    }

    /// Run the graph for one request and return the full outcome
    pub async fn run(&self, request: &ChartRequest, github_token: &str) -> Result<RunOutcome> {
        let key = request.validate()?;
        if github_token.trim().is_empty() {
            return Err(ChartError::invalid_request("GitHub token is empty"));
        }

        let team = create_team(
            Arc::clone(&self.reasoning),
            (self.sources)(github_token),
            Arc::clone(&self.datasets),
            self.script.clone(),
        );
        let ctx = SharedContext::new(request.message.trim(), key.owner(), key.repo());

        Coordinator::new(self.coordinator, team).run(ctx).await
    }

    /// Generate a chart: code and explanation, or the reported reason it
    /// could not be built
    pub async fn generate(&self, request: ChartRequest, github_token: &str) -> Result<ChartResponse> {
        let key = request.validate()?;
        let outcome = self.run(&request, github_token).await?;
        let ctx = outcome.context;

        // A reported error wins over any code produced alongside it
        if let Some(reason) = ctx.error() {
            return Err(ChartError::WorkerReported(reason.to_string()));
        }
        let Some(code) = ctx.code() else {
            return Err(ChartError::WorkerReported(
                crate::swarm::NO_OUTPUT_ERROR.to_string(),
            ));
        };

        if let Err(e) = self.artifacts.write(&key, code).await {
            tracing::warn!(repo = %key, error = %e, "Failed to persist chart component");
        }

        Ok(ChartResponse {
            code: code.to_string(),
            explanation: ctx
                .code_output
                .as_ref()
                .and_then(|output| output.explanation.clone())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str, owner: &str, repo: &str) -> ChartRequest {
        ChartRequest {
            message: message.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    #[test]
    fn test_validate() {
        let key = request("Issues per week", " acme ", "widgets").validate().unwrap();
        assert_eq!(key.to_string(), "acme/widgets");

        assert!(matches!(
            request("  ", "acme", "widgets").validate(),
            Err(ChartError::InvalidRequest(_))
        ));
        assert!(matches!(
            request("Issues", "acme", "../etc").validate(),
            Err(ChartError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_value(ChartResponse {
            code: "export default function Chart() {}".to_string(),
            explanation: "Empty chart".to_string(),
        })
        .unwrap();
        assert_eq!(json["code"], "export default function Chart() {}");
        assert_eq!(json["explanation"], "Empty chart");
    }
}
