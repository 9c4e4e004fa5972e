//! # Pipeline
//!
//! Graph nodes and the hop budget of a run.
//!
//! ```text
//! START -> supervisor -> planner | analyst | developer -> supervisor -> ...
//!                     -> FINISH
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChartError, Result};
use crate::state::Route;

/// A node of the orchestration graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Supervisor,
    Planner,
    Analyst,
    Developer,
}

impl Node {
    /// Worker node a routing decision points at; `None` for FINISH
    pub fn for_route(route: Route) -> Option<Node> {
        match route {
            Route::Planner => Some(Node::Planner),
            Route::Analyst => Some(Node::Analyst),
            Route::Developer => Some(Node::Developer),
            Route::Finish => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Supervisor => "supervisor",
            Node::Planner => "planner",
            Node::Analyst => "analyst",
            Node::Developer => "developer",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nodes executed during one run, under a hop budget
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Nodes executed so far, in order
    pub trace: Vec<Node>,
    /// Maximum node executions before failing
    pub max_hops: u32,
}

impl Pipeline {
    pub fn new(max_hops: u32) -> Self {
        Self {
            trace: Vec::new(),
            max_hops,
        }
    }

    /// Number of node executions so far
    pub fn hops(&self) -> u32 {
        self.trace.len() as u32
    }

    /// Count one node execution against the budget
    pub fn enter(&mut self, node: Node) -> Result<()> {
        if self.hops() >= self.max_hops {
            return Err(ChartError::RunBudgetExceeded(format!(
                "{} node executions without FINISH (next was {})",
                self.max_hops, node
            )));
        }
        self.trace.push(node);
        Ok(())
    }
}
