//! # Shared Context
//!
//! The run state threaded through the orchestration graph, and the pure
//! `merge` that applies one node's delta to it.
//!
//! `history` only ever grows: merges append and keep the old prefix intact.
//! Every other delta field overwrites its slot when present.

use chrono::{DateTime, Utc};
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::outputs::{AnalystOutput, DeveloperOutput, PlannerOutput};

/// Who emitted a history entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Planner,
    Analyst,
    Developer,
    Supervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Planner => "planner",
            Role::Analyst => "analyst",
            Role::Developer => "developer",
            Role::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the run history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// History entry carrying a worker output serialized as JSON
    pub fn from_output<T: Serialize>(role: Role, output: &T) -> crate::error::Result<Self> {
        Ok(Self::new(role, serde_json::to_string(output)?))
    }
}

/// Supervisor routing decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq, Hash)]
pub enum Route {
    #[serde(rename = "planner")]
    Planner,
    #[serde(rename = "analyst")]
    Analyst,
    #[serde(rename = "developer")]
    Developer,
    #[serde(rename = "FINISH")]
    Finish,
}

impl Route {
    /// Team members the supervisor can route to, in nominal order
    pub const TEAM: [Route; 3] = [Route::Planner, Route::Analyst, Route::Developer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Planner => "planner",
            Route::Analyst => "analyst",
            Route::Developer => "developer",
            Route::Finish => "FINISH",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable run state, one per request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedContext {
    message: String,
    owner: String,
    repo: String,
    pub history: Vec<Message>,
    pub routing_decision: Option<Route>,
    pub plan_output: Option<PlannerOutput>,
    pub analysis_output: Option<AnalystOutput>,
    pub code_output: Option<DeveloperOutput>,
    pub error_message: Option<String>,
}

impl SharedContext {
    /// Create the initial context, seeding history with the user's request
    pub fn new(
        message: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            history: vec![Message::new(Role::User, message.clone())],
            message,
            owner: owner.into(),
            repo: repo.into(),
            routing_decision: None,
            plan_output: None,
            analysis_output: None,
            code_output: None,
            error_message: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Non-empty generated code, if any
    pub fn code(&self) -> Option<&str> {
        self.code_output
            .as_ref()
            .map(|o| o.code.as_str())
            .filter(|c| !c.trim().is_empty())
    }

    /// Non-empty error message, if any
    pub fn error(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .filter(|e| !e.trim().is_empty())
    }
}

/// Partial update produced by one node execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextDelta {
    pub history: Vec<Message>,
    pub routing_decision: Option<Route>,
    pub plan_output: Option<PlannerOutput>,
    pub analysis_output: Option<AnalystOutput>,
    pub code_output: Option<DeveloperOutput>,
    pub error_message: Option<String>,
}

impl ContextDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.history.push(message);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error_message = Some(error.into());
        self
    }
}

/// Apply a delta: history concatenates, every other field is
/// last-writer-wins when present in the delta.
pub fn merge(old: SharedContext, delta: ContextDelta) -> SharedContext {
    let mut next = old;
    next.history.extend(delta.history);
    if delta.routing_decision.is_some() {
        next.routing_decision = delta.routing_decision;
    }
    if delta.plan_output.is_some() {
        next.plan_output = delta.plan_output;
    }
    if delta.analysis_output.is_some() {
        next.analysis_output = delta.analysis_output;
    }
    if delta.code_output.is_some() {
        next.code_output = delta.code_output;
    }
    if delta.error_message.is_some() {
        next.error_message = delta.error_message;
    }
    next
}
