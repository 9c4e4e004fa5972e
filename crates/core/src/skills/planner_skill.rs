//! # Planner Skill
//!
//! Turns the user's request into requirements, acceptance criteria and a
//! technical spec.

use async_trait::async_trait;
use std::sync::Arc;

use super::prompts;
use super::tools::output_tools::CREATE_TECHNICAL_PLAN;
use super::Worker;
use crate::error::Result;
use crate::reasoning::{ReasoningRequest, ReasoningService};
use crate::state::{ContextDelta, Message, PlannerOutput, Role, SharedContext};

/// Planner worker
pub struct PlannerSkill<S> {
    reasoning: Arc<S>,
}

impl<S: ReasoningService> PlannerSkill<S> {
    pub fn new(reasoning: Arc<S>) -> Self {
        Self { reasoning }
    }

    /// Produce the plan without touching the context
    pub async fn plan(&self, ctx: &SharedContext) -> Result<PlannerOutput> {
        let input = format!(
            "Create a technical plan for a chart answering this request: {}\n\
             The chart visualizes data from the GitHub repository {}.",
            ctx.message(),
            ctx.repo_slug()
        );
        let request = ReasoningRequest::new("planner", prompts::PLANNER, input);

        let payload = self
            .reasoning
            .invoke(request, &CREATE_TECHNICAL_PLAN)
            .await?;
        payload.decode()
    }
}

#[async_trait]
impl<S: ReasoningService> Worker for PlannerSkill<S> {
    fn role(&self) -> Role {
        Role::Planner
    }

    async fn execute(&self, ctx: &SharedContext) -> Result<ContextDelta> {
        let plan = self.plan(ctx).await?;
        tracing::info!(
            repo = %ctx.repo_slug(),
            chart_type = %plan.technical_spec.chart_type,
            requirements = plan.requirements.len(),
            "Plan created"
        );

        let mut delta = ContextDelta::new().with_message(Message::from_output(Role::Planner, &plan)?);
        if let Some(error) = &plan.error_message {
            tracing::warn!(error = %error, "Planner reported the request as infeasible");
            delta = delta.with_error(error.clone());
        }
        delta.plan_output = Some(plan);
        Ok(delta)
    }
}
