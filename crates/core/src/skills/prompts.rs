//! Prompt templates bundled at compile time.

/// Planner - turns the request into a technical plan
pub const PLANNER: &str = include_str!("defaults/planner.md");

/// Analyst - fetches and reshapes repository data
pub const ANALYST: &str = include_str!("defaults/analyst.md");

/// Developer - writes the chart component
pub const DEVELOPER: &str = include_str!("defaults/developer.md");

/// Supervisor - routes between the workers
pub const SUPERVISOR: &str = include_str!("defaults/supervisor.md");
