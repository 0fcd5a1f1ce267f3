//! CI gate evaluation for pass/fail criteria.

use crate::pipeline::PipelineResult;
use serde::{Deserialize, Serialize};

/// Gate evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Whether the gate passed.
    pub passed: bool,

    /// Violations that caused failure (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// CI gate evaluation rules.
pub struct Gate;

impl Gate {
    /// Evaluate a pipeline run.
    ///
    /// Every stage that did not exit 0 is a violation. A run where every
    /// stage was disabled also fails, since nothing was verified.
    pub fn evaluate(result: &PipelineResult) -> GateVerdict {
        let mut violations = Vec::new();

        for stage in &result.stages {
            if stage.passed() {
                continue;
            }
            if stage.exit_code == -1 {
                let reason = stage.stderr.lines().next().unwrap_or("unknown error");
                violations.push(format!("Stage '{}' failed: {}", stage.stage_name, reason));
            } else {
                violations.push(format!(
                    "Stage '{}' returned non-zero exit code: {}",
                    stage.stage_name, stage.exit_code
                ));
            }
        }

        if result.stages.is_empty() {
            violations.push("No stages were executed".to_string());
        }

        let passed = violations.is_empty();
        let message = if passed {
            format!("All {} stage(s) passed", result.stages.len())
        } else {
            format!("Gate failed with {} violation(s)", violations.len())
        };

        GateVerdict {
            passed,
            violations,
            message,
        }
    }
}
