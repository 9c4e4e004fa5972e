//! # Skills
//!
//! The agents of a chart run and the tools they call.
//!
//! ```text
//! SupervisorSkill (routes)
//!   ├── PlannerSkill    -> create_technical_plan
//!   ├── AnalystSkill    -> get_repo_* tools -> create_dataset
//!   └── DeveloperSkill  -> run_script -> create_developer_output
//! ```
//!
//! Every worker binds a system prompt, its allowed tools and a reasoning
//! service handle, runs one reasoning loop per invocation and returns a
//! [`ContextDelta`] carrying its typed output plus exactly one history entry.

pub mod prompts;
pub mod tools;

pub mod analyst_skill;
pub mod developer_skill;
pub mod planner_skill;
pub mod supervisor_skill;

// Team factory
pub mod agent_definitions;

use async_trait::async_trait;

use crate::error::Result;
use crate::state::{ContextDelta, Role, SharedContext};

pub use agent_definitions::{create_team, Team};
pub use analyst_skill::AnalystSkill;
pub use developer_skill::DeveloperSkill;
pub use planner_skill::PlannerSkill;
pub use supervisor_skill::{RouteDecision, Supervisor, SupervisorSkill};

/// A data-plane node of the graph
#[async_trait]
pub trait Worker: Send + Sync {
    /// Role tagging the history entry this worker appends
    fn role(&self) -> Role;

    /// Run once against the current context
    async fn execute(&self, ctx: &SharedContext) -> Result<ContextDelta>;
}
