//! Tracing setup shared by `bincode-echo` and `bincode-ci`.
//!
//! Both binaries log through the same [`EnvFilter`] rules: `RUST_LOG` wins
//! when set, otherwise the level chosen on the command line applies. The
//! global subscriber can only be installed once per process, so later calls
//! report `false` and change nothing.

use std::io;
use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Stream the log lines go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogWriter {
    #[default]
    Stdout,
    /// Keeps stdout free for reports that other tools parse.
    Stderr,
}

impl LogWriter {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogWriter::Stdout => BoxMakeWriter::new(io::stdout),
            LogWriter::Stderr => BoxMakeWriter::new(io::stderr),
        }
    }
}

/// How a binary wants its logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Emit one JSON object per line.
    pub json: bool,
    /// Level used when `RUST_LOG` is unset.
    pub level: Level,
    pub writer: LogWriter,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::INFO,
            writer: LogWriter::default(),
        }
    }
}

impl TelemetryConfig {
    /// `DEBUG` for `--verbose`, `INFO` otherwise.
    pub fn verbose(verbose: bool) -> Self {
        let level = if verbose { Level::DEBUG } else { Level::INFO };
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_writer(mut self, writer: LogWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Directive applied when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> String {
        self.level.as_str().to_ascii_lowercase()
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }

    /// Install the global subscriber. Returns whether this call installed it.
    pub fn init(&self) -> bool {
        let layer = fmt::layer()
            .with_target(false)
            .with_writer(self.writer.make_writer());
        let registry = tracing_subscriber::registry().with(self.env_filter());

        let installed = if self.json {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer).try_init()
        };
        installed.is_ok()
    }
}

/// Install the global subscriber with the given format, level and writer.
pub fn init_tracing(json: bool, level: Level, writer: LogWriter) -> bool {
    TelemetryConfig {
        json,
        level,
        writer,
    }
    .init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_selects_debug() {
        assert_eq!(TelemetryConfig::verbose(true).level, Level::DEBUG);
        assert_eq!(TelemetryConfig::verbose(false).level, Level::INFO);
        assert_eq!(TelemetryConfig::verbose(true).default_directive(), "debug");
    }

    #[test]
    fn test_builders() {
        let config = TelemetryConfig::default()
            .with_json(true)
            .with_writer(LogWriter::Stderr);
        assert!(config.json);
        assert_eq!(config.writer, LogWriter::Stderr);
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false, Level::INFO, LogWriter::Stderr);
        assert!(!init_tracing(true, Level::DEBUG, LogWriter::Stdout));
        tracing::info!("still logging after the second init");
    }
}
