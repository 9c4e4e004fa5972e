//! # Developer Skill
//!
//! Writes the TypeScript chart component from the plan and the analyst's
//! dataset description. Runs only once both exist.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use super::prompts;
use super::tools::output_tools::CREATE_DEVELOPER_OUTPUT;
use super::tools::{run_script_tool, ScriptConfig};
use super::Worker;
use crate::error::{ChartError, Result};
use crate::reasoning::{ReasoningRequest, ReasoningService};
use crate::state::{
    AnalystOutput, ContextDelta, DeveloperOutput, Message, PlannerOutput, Role, SharedContext,
};

/// Developer worker
pub struct DeveloperSkill<S> {
    reasoning: Arc<S>,
    script: ScriptConfig,
}

impl<S: ReasoningService> DeveloperSkill<S> {
    pub fn new(reasoning: Arc<S>, script: ScriptConfig) -> Self {
        Self { reasoning, script }
    }

    /// Produce the component without touching the context
    pub async fn develop(&self, ctx: &SharedContext) -> Result<DeveloperOutput> {
        let plan = ctx.plan_output.as_ref().ok_or(ChartError::Precondition {
            worker: "developer",
            missing: "plan_output",
        })?;
        let analysis = ctx.analysis_output.as_ref().ok_or(ChartError::Precondition {
            worker: "developer",
            missing: "analysis_output",
        })?;

        let input = task_prompt(plan, analysis, Utc::now().date_naive())?;
        let request = ReasoningRequest::new("developer", prompts::DEVELOPER, input)
            .with_tools([run_script_tool(self.script.clone())]);

        let output = self
            .reasoning
            .invoke(request, &CREATE_DEVELOPER_OUTPUT)
            .await?;
        Ok(output.normalized())
    }
}

#[async_trait]
impl<S: ReasoningService> Worker for DeveloperSkill<S> {
    fn role(&self) -> Role {
        Role::Developer
    }

    async fn execute(&self, ctx: &SharedContext) -> Result<ContextDelta> {
        let output = self.develop(ctx).await?;
        tracing::info!(
            repo = %ctx.repo_slug(),
            code_len = output.code.len(),
            "Chart component written"
        );

        let mut delta =
            ContextDelta::new().with_message(Message::from_output(Role::Developer, &output)?);
        if let Some(error) = &output.error_message {
            tracing::warn!(error = %error, "Developer reported the chart as infeasible");
            delta = delta.with_error(error.clone());
        }
        delta.code_output = Some(output);
        Ok(delta)
    }
}

/// Task given to the model
pub fn task_prompt(
    plan: &PlannerOutput,
    analysis: &AnalystOutput,
    today: NaiveDate,
) -> Result<String> {
    Ok(format!(
        "Implement the following technical spec in TypeScript.\n\
         Requirements: {}\n\
         Technical spec: {}\n\
         Data sample: {}\n\
         Data description: {}\n\
         Load the full dataset from this static route: {}\n\
         The current date is {}.",
        serde_json::to_string(&plan.requirements)?,
        serde_json::to_string(&plan.technical_spec)?,
        serde_json::to_string(&analysis.data_sample)?,
        serde_json::to_string(&analysis.data_description)?,
        analysis.file_route,
        today.format("%Y-%m-%d")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DataDescription, TechnicalSpec};
    use serde_json::json;

    #[test]
    fn test_task_prompt() {
        let plan = PlannerOutput {
            requirements: vec!["Show merged PRs per month".to_string()],
            acceptance_criteria: vec![],
            technical_spec: TechnicalSpec {
                chart_type: "line".to_string(),
                data_format: "{month, merged}".to_string(),
                constraints: vec![],
            },
            error_message: None,
        };
        let record = json!({ "month": "2024-04", "merged": 12 });
        let records = vec![record.as_object().unwrap().clone()];
        let analysis = AnalystOutput {
            data_description: DataDescription::describe(&records, "acme/widgets").unwrap(),
            data_sample: records,
            file_route: "/charts/acme/widgets/data.json".to_string(),
        };

        let prompt = task_prompt(
            &plan,
            &analysis,
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
        )
        .unwrap();

        assert!(prompt.contains("Show merged PRs per month"));
        assert!(prompt.contains("\"merged\":12"));
        assert!(prompt.contains("\"total_records\":1"));
        assert!(prompt.contains("/charts/acme/widgets/data.json"));
        assert!(prompt.ends_with("The current date is 2024-05-03."));
    }
}
