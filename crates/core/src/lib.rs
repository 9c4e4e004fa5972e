//! # RepoChart Core
//!
//! Turns a natural-language chart request about a GitHub repository into a
//! TypeScript chart component and the dataset it renders.
//!
//! ## Architecture
//!
//! - `skills/` - Supervisor, planner, analyst and developer, plus their tools
//! - `swarm/` - Coordinator running the supervisor/worker graph
//! - `state/` - Shared run context, typed worker outputs, dataset/artifact stores
//! - `reasoning/` - Boundary to the language model (radkit)
//! - `github/` - GraphQL data source and response decoding
//! - `models` - LLM provider and per-agent model selection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repochart_core::{ChartRequest, ChartService, Settings};
//!
//! let settings = Settings::from_env()?;
//! let service = ChartService::from_settings(&settings)?;
//! let chart = service.generate(request, &github_token).await?;
//! ```

pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod reasoning;
pub mod service;
pub mod skills;
pub mod state;
pub mod swarm;

pub use config::Settings;
pub use error::{ChartError, Result};
pub use service::{ChartRequest, ChartResponse, ChartService, SourceFactory};
