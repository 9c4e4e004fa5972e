//! # Team Definitions
//!
//! Composes the supervisor and the three workers around one reasoning service.

use std::sync::Arc;

use super::tools::ScriptConfig;
use super::{AnalystSkill, DeveloperSkill, PlannerSkill, Supervisor, SupervisorSkill, Worker};
use crate::github::RepoDataSource;
use crate::reasoning::ReasoningService;
use crate::state::{DatasetStore, Route};

/// The supervisor and its workers for one run
#[derive(Clone)]
pub struct Team {
    pub supervisor: Arc<dyn Supervisor>,
    pub planner: Arc<dyn Worker>,
    pub analyst: Arc<dyn Worker>,
    pub developer: Arc<dyn Worker>,
}

impl Team {
    /// Worker behind a routing decision; `None` for FINISH
    pub fn worker(&self, route: Route) -> Option<&Arc<dyn Worker>> {
        match route {
            Route::Planner => Some(&self.planner),
            Route::Analyst => Some(&self.analyst),
            Route::Developer => Some(&self.developer),
            Route::Finish => None,
        }
    }
}

/// Build the standard team
///
/// The data source carries the caller's GitHub credential, so a team is
/// built per request.
pub fn create_team<S>(
    reasoning: Arc<S>,
    source: Arc<dyn RepoDataSource>,
    datasets: Arc<dyn DatasetStore>,
    script: ScriptConfig,
) -> Team
where
    S: ReasoningService + 'static,
{
    Team {
        supervisor: Arc::new(SupervisorSkill::new(Arc::clone(&reasoning))),
        planner: Arc::new(PlannerSkill::new(Arc::clone(&reasoning))),
        analyst: Arc::new(AnalystSkill::new(Arc::clone(&reasoning), source, datasets)),
        developer: Arc::new(DeveloperSkill::new(reasoning, script)),
    }
}
