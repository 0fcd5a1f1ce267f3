//! bincode-ci - run the hosted CI stages locally
//!
//! Mirrors the jobs of `azure-pipelines.yml` and the GitHub `Check`
//! workflow:
//! - Executes the cargo stages (fmt check, check with warnings denied, test)
//! - Collects per-stage results into a pipeline result
//! - Evaluates a pass/fail gate over the run

pub mod gate;
pub mod hosted;
pub mod pipeline;
pub mod runner;
pub mod stage;

// Re-export key types
pub use gate::{Gate, GateVerdict};
pub use hosted::{hosted_jobs, local_stages, HostedJob, Platform, Trigger};
pub use pipeline::{Pipeline, PipelineResult};
pub use runner::{StageResult, StageRunner};
pub use stage::{BuiltinStage, StageConfig, UnknownStage};
