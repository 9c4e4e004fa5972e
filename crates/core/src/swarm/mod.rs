//! # Swarm Orchestration
//!
//! Coordinates the supervisor and the workers of a chart run.
//!
//! ## Flow
//!
//! ```text
//! Request -> Supervisor -> Planner -> Supervisor -> Analyst -> Supervisor -> Developer -> Supervisor -> FINISH
//! ```

pub mod coordinator;
pub mod events;
pub mod pipeline;

pub use coordinator::{Coordinator, CoordinatorConfig, RunOutcome, NO_OUTPUT_ERROR};
pub use events::{SwarmEvent, SwarmEventKind};
pub use pipeline::{Node, Pipeline};
