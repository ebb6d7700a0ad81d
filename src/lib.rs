//! specforge library
//!
//! Pipeline, configuration and artifact output behind the `specforge` CLI.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;

pub use artifacts::{write_artifacts, Manifest};
pub use config::Config;
pub use errors::{SpecForgeError, SpecForgeResult};
pub use pipeline::{load_knowledge, load_scenarios, Pipeline, PipelineOutput, RunSummary};
