//! CI stage execution.

use crate::stage::StageConfig;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Result of a stage execution.
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    /// Stage name.
    pub stage_name: String,

    /// Exit code (0 = success, -1 when the process never produced one).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether execution succeeded.
    pub success: bool,
}

impl StageResult {
    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }

    /// A stage that could not be run at all (spawn error, timeout).
    pub fn errored(stage_name: &str, error: &anyhow::Error, duration_ms: u64) -> Self {
        StageResult {
            stage_name: stage_name.to_string(),
            exit_code: -1,
            stdout: String::new(),
            stderr: format!("{:#}", error),
            duration_ms,
            success: false,
        }
    }
}

/// Executes a single stage in a workspace directory.
pub struct StageRunner;

impl StageRunner {
    /// Execute a single stage and return the result.
    ///
    /// A non-zero exit is reported in the result. Spawn failures and
    /// timeouts are errors.
    pub async fn execute(config: &StageConfig, workspace: &Path) -> anyhow::Result<StageResult> {
        let start = Instant::now();

        let (exe, args) = config
            .command
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("Stage {} has empty command", config.name))?;

        debug!(
            stage = %config.name,
            command = ?config.command,
            env = ?config.env,
            "Spawning stage"
        );

        let child = Command::new(exe)
            .args(args)
            .envs(&config.env)
            .current_dir(workspace)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                anyhow::anyhow!("Failed to spawn stage {} ({}): {}", config.name, exe, e)
            })?;

        let output = if config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Stage {} timed out after {} seconds",
                    config.name,
                    config.timeout_secs
                )
            })??
        } else {
            child.wait_with_output().await?
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(StageResult {
            stage_name: config.name.clone(),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
            success: output.status.success(),
        })
    }
}
