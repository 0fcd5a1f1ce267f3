//! Integration tests for the local CI pipeline.
#![cfg(unix)]

use bincode_ci::{Gate, Pipeline, StageConfig, StageRunner};
use std::path::Path;

fn shell(name: &str, script: &str, timeout_secs: u64) -> StageConfig {
    StageConfig::custom(
        name.to_string(),
        vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        timeout_secs,
    )
}

/// Test: successful pipeline execution (both stages pass)
#[tokio::test]
async fn test_successful_pipeline() {
    let stages = vec![
        StageConfig::custom(
            "echo_test".to_string(),
            vec!["echo".to_string(), "hello".to_string()],
            60,
        ),
        StageConfig::custom(
            "echo_test2".to_string(),
            vec!["echo".to_string(), "world".to_string()],
            60,
        ),
    ];

    let result = Pipeline::run(Path::new("."), stages).await;

    assert!(result.success, "Pipeline should succeed");
    assert_eq!(result.passed_count(), 2, "Both stages should pass");
    assert_eq!(result.failed_count(), 0, "No stages should fail");
    assert_eq!(result.stages[0].stdout.trim(), "hello");
    assert_eq!(result.stages[1].stdout.trim(), "world");

    let verdict = Gate::evaluate(&result);
    assert!(verdict.passed);
}

/// Test: a failing stage does not stop later stages
#[tokio::test]
async fn test_failed_stage_captured() {
    let stages = vec![
        shell("broken", "echo boom >&2; exit 3", 60),
        shell("after", "echo still ran", 60),
    ];

    let result = Pipeline::run(Path::new("."), stages).await;

    assert!(!result.success);
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.stages[0].exit_code, 3);
    assert_eq!(result.stages[0].stderr.trim(), "boom");
    assert!(result.stages[1].passed());

    let verdict = Gate::evaluate(&result);
    assert!(!verdict.passed);
    assert_eq!(verdict.violations.len(), 1);
    assert!(verdict.violations[0].contains("broken"));
}

/// Test: disabled stages are skipped and reported
#[tokio::test]
async fn test_disabled_stage_skipped() {
    let stages = vec![
        shell("runs", "true", 60),
        shell("never", "exit 1", 60).disabled(),
    ];

    let result = Pipeline::run(Path::new("."), stages).await;

    assert!(result.success);
    assert_eq!(result.stages.len(), 1);
    assert_eq!(result.skipped, vec!["never".to_string()]);
}

/// Test: a stage exceeding its timeout is recorded as errored
#[tokio::test]
async fn test_timeout_recorded_as_failure() {
    let result = Pipeline::run(Path::new("."), vec![shell("slow", "sleep 5", 1)]).await;

    assert!(!result.success);
    assert_eq!(result.stages[0].exit_code, -1);
    assert!(result.stages[0].stderr.contains("timed out"));

    let verdict = Gate::evaluate(&result);
    assert!(verdict.violations[0].contains("timed out"));
}

/// Test: missing executables are errors from the runner, failures in the pipeline
#[tokio::test]
async fn test_missing_executable() {
    let config = StageConfig::custom(
        "ghost".to_string(),
        vec!["definitely-not-a-real-binary-7f3a".to_string()],
        10,
    );

    let err = StageRunner::execute(&config, Path::new("."))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to spawn"));

    let result = Pipeline::run(Path::new("."), vec![config]).await;
    assert_eq!(result.failed_count(), 1);
}

/// Test: stage env and working directory are applied
#[tokio::test]
async fn test_env_and_workspace_applied() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "present").unwrap();

    let config = shell("env", "printf '%s ' \"$RUSTFLAGS\"; cat marker.txt", 10)
        .with_env("RUSTFLAGS", "-D warnings");

    let result = StageRunner::execute(&config, dir.path()).await.unwrap();
    assert!(result.passed());
    assert_eq!(result.stdout, "-D warnings present");
}
