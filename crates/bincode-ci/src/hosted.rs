//! Typed mirror of the hosted pipeline definitions.
//!
//! `azure-pipelines.yml` and `.github/workflows/check.yml` are consumed by
//! the hosted platforms directly. The values here restate them so the local
//! runner executes the same commands, and the `hosted_config` test keeps
//! the two in agreement.

use crate::stage::BuiltinStage;
use serde::Serialize;

/// Hosted CI platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    AzurePipelines,
    GithubActions,
}

impl Platform {
    /// Path of the definition file, relative to the repository root.
    pub fn config_path(&self) -> &'static str {
        match self {
            Platform::AzurePipelines => "azure-pipelines.yml",
            Platform::GithubActions => ".github/workflows/check.yml",
        }
    }
}

/// What starts a hosted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Trigger {
    /// Pushes to the given branch.
    Push { branch: Option<String> },
    /// Pull requests against the given branch.
    PullRequest { branch: Option<String> },
}

/// One job of a hosted pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct HostedJob {
    pub platform: Platform,
    pub name: &'static str,
    pub triggers: Vec<Trigger>,
    /// Azure VM images, or GitHub runner labels.
    pub images: Vec<&'static str>,
    pub toolchain: &'static str,
    pub stage: BuiltinStage,
}

impl HostedJob {
    /// Full command line as written in the definition file.
    pub fn command_line(&self) -> String {
        self.stage.command().join(" ")
    }

    /// Whether the job fans out over several VM images. GitHub labels all
    /// have to match one runner, so they never form a matrix.
    pub fn is_matrix(&self) -> bool {
        self.platform == Platform::AzurePipelines && self.images.len() > 1
    }
}

/// Branch the Azure pipeline builds.
pub const AZURE_BRANCH: &str = "master";

/// Nightly toolchain pinned by the GitHub `Check` workflow.
pub const PINNED_NIGHTLY: &str = "nightly-2020-08-23";

/// Every job declared by the hosted pipelines.
pub fn hosted_jobs() -> Vec<HostedJob> {
    let azure_triggers = vec![
        Trigger::Push {
            branch: Some(AZURE_BRANCH.to_string()),
        },
        Trigger::PullRequest {
            branch: Some(AZURE_BRANCH.to_string()),
        },
    ];

    vec![
        HostedJob {
            platform: Platform::AzurePipelines,
            name: "rustfmt",
            triggers: azure_triggers.clone(),
            images: vec!["ubuntu-latest"],
            toolchain: "stable",
            stage: BuiltinStage::FmtCheck,
        },
        HostedJob {
            platform: Platform::AzurePipelines,
            name: "test_stable",
            triggers: azure_triggers,
            images: vec!["ubuntu-latest", "macOS-latest", "windows-latest"],
            toolchain: "stable",
            stage: BuiltinStage::TestAll,
        },
        HostedJob {
            platform: Platform::GithubActions,
            name: "check",
            triggers: vec![
                Trigger::Push { branch: None },
                Trigger::PullRequest { branch: None },
            ],
            images: vec!["self-hosted", "rust"],
            toolchain: PINNED_NIGHTLY,
            stage: BuiltinStage::CheckDenyWarnings,
        },
    ]
}

/// The local stages, one per hosted job, in pipeline order.
pub fn local_stages() -> Vec<BuiltinStage> {
    let jobs = hosted_jobs();
    BuiltinStage::ALL
        .into_iter()
        .filter(|stage| jobs.iter().any(|job| job.stage == *stage))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_stage_has_a_hosted_job() {
        assert_eq!(local_stages(), BuiltinStage::ALL.to_vec());
    }

    #[test]
    fn test_only_azure_test_job_is_a_matrix() {
        let matrix: Vec<_> = hosted_jobs()
            .into_iter()
            .filter(HostedJob::is_matrix)
            .map(|job| job.name)
            .collect();
        assert_eq!(matrix, vec!["test_stable"]);
    }

    #[test]
    fn test_github_check_job() {
        let job = hosted_jobs()
            .into_iter()
            .find(|job| job.platform == Platform::GithubActions)
            .unwrap();
        assert_eq!(job.toolchain, "nightly-2020-08-23");
        assert_eq!(job.command_line(), "cargo check");
        assert!(job.triggers.contains(&Trigger::Push { branch: None }));
    }
}
