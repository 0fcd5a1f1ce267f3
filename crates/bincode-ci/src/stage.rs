//! CI stage definitions and configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Builtin CI stages, one per hosted job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStage {
    /// cargo fmt --all -- --check
    FmtCheck,

    /// cargo check, warnings denied, incremental compilation off
    CheckDenyWarnings,

    /// cargo test --all --all-features
    TestAll,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown stage '{0}' (expected fmt, check or test)")]
pub struct UnknownStage(pub String);

impl BuiltinStage {
    /// Every builtin stage, in pipeline order.
    pub const ALL: [BuiltinStage; 3] = [
        BuiltinStage::FmtCheck,
        BuiltinStage::CheckDenyWarnings,
        BuiltinStage::TestAll,
    ];

    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinStage::FmtCheck => "cargo_fmt",
            BuiltinStage::CheckDenyWarnings => "cargo_check",
            BuiltinStage::TestAll => "cargo_test",
        }
    }

    /// Get the stage's command.
    pub fn command(&self) -> Vec<String> {
        let args: &[&str] = match self {
            BuiltinStage::FmtCheck => &["cargo", "fmt", "--all", "--", "--check"],
            BuiltinStage::CheckDenyWarnings => &["cargo", "check"],
            BuiltinStage::TestAll => &["cargo", "test", "--all", "--all-features"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }

    /// Environment the stage runs with, on top of the inherited one.
    pub fn env(&self) -> BTreeMap<String, String> {
        match self {
            BuiltinStage::CheckDenyWarnings => BTreeMap::from([
                ("RUSTFLAGS".to_string(), "-D warnings".to_string()),
                ("CARGO_INCREMENTAL".to_string(), "0".to_string()),
            ]),
            _ => BTreeMap::new(),
        }
    }

    /// Parse a comma-separated stage list such as `fmt,check`.
    pub fn parse_list(list: &str) -> Result<Vec<BuiltinStage>, UnknownStage> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(BuiltinStage::from_str)
            .collect()
    }
}

impl FromStr for BuiltinStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fmt" | "cargo_fmt" | "rustfmt" => Ok(BuiltinStage::FmtCheck),
            "check" | "cargo_check" => Ok(BuiltinStage::CheckDenyWarnings),
            "test" | "cargo_test" => Ok(BuiltinStage::TestAll),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

/// Configuration for a CI stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Human-readable stage name.
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Extra environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Timeout in seconds (0 disables the timeout).
    pub timeout_secs: u64,

    /// Whether this stage is enabled.
    pub enabled: bool,
}

impl StageConfig {
    /// Create a new stage configuration from a builtin stage.
    pub fn from_builtin(stage: BuiltinStage, timeout_secs: u64) -> Self {
        Self {
            name: stage.name().to_string(),
            command: stage.command(),
            env: stage.env(),
            timeout_secs,
            enabled: true,
        }
    }

    /// Create a custom stage configuration.
    pub fn custom(name: String, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            name,
            command,
            env: BTreeMap::new(),
            timeout_secs,
            enabled: true,
        }
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Disable this stage.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
