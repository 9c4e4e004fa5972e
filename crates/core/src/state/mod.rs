//! # State
//!
//! The run context, the typed worker outputs and the stores for what outlives
//! a run.

pub mod context;
pub mod outputs;
pub mod store;

pub use context::{merge, ContextDelta, Message, Role, Route, SharedContext};
pub use outputs::{
    AnalystOutput, DataDescription, DatasetPayload, DatasetSource, DeveloperOutput, PlannerOutput,
    Record, TechnicalPlanPayload, TechnicalSpec, SAMPLE_SIZE,
};
pub use store::{ArtifactStore, DatasetStore, FsArtifactStore, FsDatasetStore, RepoKey};
