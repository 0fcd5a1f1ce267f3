//! CI pipeline orchestration.

use crate::runner::{StageResult, StageRunner};
use crate::stage::StageConfig;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Result of a complete CI pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Whether all stages passed.
    pub success: bool,

    /// Results of individual stages, in execution order.
    pub stages: Vec<StageResult>,

    /// Names of stages that were skipped because they were disabled.
    pub skipped: Vec<String>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Number of stages that passed.
    pub fn passed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.passed()).count()
    }

    /// Number of stages that failed.
    pub fn failed_count(&self) -> usize {
        self.stages.iter().filter(|s| !s.passed()).count()
    }
}

/// CI pipeline orchestrator.
pub struct Pipeline;

impl Pipeline {
    /// Execute every enabled stage in order.
    ///
    /// A failing stage does not stop the pipeline, so one run reports every
    /// broken stage, the way the hosted jobs report independently.
    pub async fn run(workspace: &Path, stages: Vec<StageConfig>) -> PipelineResult {
        let start = Instant::now();
        info!(workspace = %workspace.display(), stages = stages.len(), "Starting CI pipeline");

        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for config in stages {
            if !config.enabled {
                info!(stage = %config.name, "Skipping disabled stage");
                skipped.push(config.name);
                continue;
            }

            info!(stage = %config.name, "Executing stage");
            let stage_start = Instant::now();

            let result = match StageRunner::execute(&config, workspace).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(stage = %config.name, error = %e, "Stage execution error");
                    StageResult::errored(
                        &config.name,
                        &e,
                        stage_start.elapsed().as_millis() as u64,
                    )
                }
            };

            if result.passed() {
                info!(stage = %result.stage_name, duration_ms = result.duration_ms, "Stage passed");
            } else {
                warn!(
                    stage = %result.stage_name,
                    exit_code = result.exit_code,
                    duration_ms = result.duration_ms,
                    "Stage failed"
                );
            }
            results.push(result);
        }

        let success = results.iter().all(StageResult::passed);
        let duration_ms = start.elapsed().as_millis() as u64;

        if success {
            info!(duration_ms, "CI pipeline completed successfully");
        } else {
            info!(duration_ms, "CI pipeline failed");
        }

        PipelineResult {
            success,
            stages: results,
            skipped,
            duration_ms,
        }
    }
}
