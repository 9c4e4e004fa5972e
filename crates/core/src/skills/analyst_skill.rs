//! # Analyst Skill
//!
//! Fetches repository data with the GitHub tools, lets the model reshape it
//! for the planned chart, persists the full dataset and hands the developer a
//! sample plus a description of its shape.
//!
//! Data errors (`UpstreamData`, `DataFetch`, `EmptyDataset`) do not fail the
//! run: they become the delta's `error_message` so the supervisor can finish.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::prompts;
use super::tools::output_tools::CREATE_DATASET;
use super::tools::{data_tools, FetchLog};
use super::Worker;
use crate::error::{ChartError, Result};
use crate::github::RepoDataSource;
use crate::reasoning::{ReasoningRequest, ReasoningService};
use crate::state::{
    AnalystOutput, ContextDelta, DataDescription, DatasetSource, DatasetStore, Message,
    PlannerOutput, RepoKey, Role, SharedContext, SAMPLE_SIZE,
};

/// Analyst worker
pub struct AnalystSkill<S> {
    reasoning: Arc<S>,
    source: Arc<dyn RepoDataSource>,
    datasets: Arc<dyn DatasetStore>,
}

impl<S: ReasoningService> AnalystSkill<S> {
    pub fn new(
        reasoning: Arc<S>,
        source: Arc<dyn RepoDataSource>,
        datasets: Arc<dyn DatasetStore>,
    ) -> Self {
        Self {
            reasoning,
            source,
            datasets,
        }
    }

    /// Fetch, persist and describe the dataset.
    ///
    /// The committed dataset is either the rows the model produced or the
    /// last result of the tool it names. Fails with `EmptyDataset` when that
    /// yields no records, or with the first recorded fetch error if there was
    /// one.
    pub async fn analyze(&self, ctx: &SharedContext) -> Result<AnalystOutput> {
        let plan = ctx.plan_output.as_ref().ok_or(ChartError::Precondition {
            worker: "analyst",
            missing: "plan_output",
        })?;
        let key = RepoKey::new(ctx.owner(), ctx.repo())?;

        let log = FetchLog::new();
        let request = ReasoningRequest::new("analyst", prompts::ANALYST, task_prompt(plan, &key)?)
            .with_tools(data_tools(Arc::clone(&self.source), log.clone()));

        let source = self
            .reasoning
            .invoke(request, &CREATE_DATASET)
            .await?
            .into_source()?;

        let records = match source {
            DatasetSource::Records(records) => records,
            DatasetSource::Tool(tool) => match log.fetched(&tool).await {
                Some(records) => {
                    tracing::debug!(tool = %tool, "Committing fetched records unchanged");
                    records
                }
                None => Vec::new(),
            },
        };

        if records.is_empty() {
            if let Some(fetch_error) = log.errors().await.into_iter().next() {
                return Err(fetch_error);
            }
        }

        let data_description = DataDescription::describe(&records, &key.to_string())?;
        let file_route = self.datasets.write(&key, &records).await?;
        tracing::info!(
            repo = %key,
            records = records.len(),
            route = %file_route,
            "Dataset written"
        );

        Ok(AnalystOutput {
            data_sample: records.into_iter().take(SAMPLE_SIZE).collect(),
            data_description,
            file_route,
        })
    }
}

#[async_trait]
impl<S: ReasoningService> Worker for AnalystSkill<S> {
    fn role(&self) -> Role {
        Role::Analyst
    }

    async fn execute(&self, ctx: &SharedContext) -> Result<ContextDelta> {
        match self.analyze(ctx).await {
            Ok(output) => {
                let mut delta =
                    ContextDelta::new().with_message(Message::from_output(Role::Analyst, &output)?);
                delta.analysis_output = Some(output);
                Ok(delta)
            }
            Err(e) if e.is_data_error() => {
                tracing::warn!(repo = %ctx.repo_slug(), error = %e, "Analyst could not build a dataset");
                let report = json!({ "error_message": e.to_string() });
                Ok(ContextDelta::new()
                    .with_message(Message::from_output(Role::Analyst, &report)?)
                    .with_error(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Task given to the model: the plan plus the repository identity
pub fn task_prompt(plan: &PlannerOutput, key: &RepoKey) -> Result<String> {
    Ok(format!(
        "Analyze the following requirements and fetch the GitHub data they need.\n\
         Requirements: {}\n\
         Technical spec: {}\n\
         Repository: owner `{}`, name `{}`\n\
         Decide which data to fetch and how to transform it for the chart.",
        serde_json::to_string(&plan.requirements)?,
        serde_json::to_string(&plan.technical_spec)?,
        key.owner(),
        key.repo()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TechnicalSpec;

    #[test]
    fn test_task_prompt_embeds_plan_and_repo() {
        let plan = PlannerOutput {
            requirements: vec!["Count issues per week".to_string()],
            acceptance_criteria: vec![],
            technical_spec: TechnicalSpec {
                chart_type: "bar".to_string(),
                data_format: "{week, count}".to_string(),
                constraints: vec!["Recharts".to_string()],
            },
            error_message: None,
        };
        let key = RepoKey::new("acme", "widgets").unwrap();

        let prompt = task_prompt(&plan, &key).unwrap();
        assert!(prompt.contains("Count issues per week"));
        assert!(prompt.contains("\"chart_type\":\"bar\""));
        assert!(prompt.contains("owner `acme`, name `widgets`"));
    }
}
