//! # Supervisor Skill
//!
//! The control-plane node: reads the history and picks the next worker, or
//! FINISH. It never touches any other context field; the coordinator applies
//! its decision.

use async_trait::async_trait;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::prompts;
use super::tools::output_tools::ROUTE;
use crate::error::Result;
use crate::reasoning::{ReasoningRequest, ReasoningService};
use crate::state::outputs::non_empty;
use crate::state::{Message, Route};

/// Arguments of the `route` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq)]
pub struct RouteDecision {
    /// The worker to act next, or FINISH
    pub next: Route,
    /// Why the request cannot be processed, when finishing early
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RouteDecision {
    pub fn to(next: Route) -> Self {
        Self {
            next,
            error_message: None,
        }
    }

    pub fn finish_with_error(error: impl Into<String>) -> Self {
        Self {
            next: Route::Finish,
            error_message: Some(error.into()),
        }
    }
}

/// Picks the next node from the run history
#[async_trait]
pub trait Supervisor: Send + Sync {
    async fn decide(&self, history: &[Message]) -> Result<RouteDecision>;
}

/// Reasoning-backed supervisor
pub struct SupervisorSkill<S> {
    reasoning: Arc<S>,
}

impl<S: ReasoningService> SupervisorSkill<S> {
    pub fn new(reasoning: Arc<S>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl<S: ReasoningService> Supervisor for SupervisorSkill<S> {
    async fn decide(&self, history: &[Message]) -> Result<RouteDecision> {
        let request = ReasoningRequest::new("supervisor", prompts::SUPERVISOR, routing_question())
            .with_history(history.to_vec());

        let decision = self.reasoning.invoke(request, &ROUTE).await?;
        Ok(RouteDecision {
            next: decision.next,
            error_message: non_empty(decision.error_message),
        })
    }
}

/// Closing instruction listing the allowed answers
fn routing_question() -> String {
    let options = std::iter::once(Route::Finish)
        .chain(Route::TEAM)
        .map(|route| route.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Given the conversation above, who should act next? Or should we FINISH? \
         Select one of: {}. If the request is unprocessable, FINISH and provide an error message.",
        options
    )
}
