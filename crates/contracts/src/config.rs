//! Runtime configuration contracts that can be shared across crates.
//!
//! Covers the ambient settings of a process hosting pipes (logging, metrics,
//! reporting window) and the in-memory bench stage driven by the CLI.
//! Every section and field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Logging and metrics exporter
    #[serde(default)]
    pub observability: ObservabilitySettings,

    /// Pipe duration reporting
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// In-memory bench stage
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logs
    #[default]
    Json,
    /// Human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging and metrics exporter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log format
    pub log_format: LogFormat,
    /// Default log level (overridden by RUST_LOG)
    pub log_level: String,
    /// Prometheus exporter port (None = disabled)
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            log_level: "info".to_string(),
            metrics_port: None,
        }
    }
}

/// Reporting window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Length of a reporting window in milliseconds
    pub report_interval_ms: u64,
}

impl MonitorConfig {
    /// Reporting window as a `Duration`
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: 1000,
        }
    }
}

/// In-memory bench stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Messages pushed through the stage (0 = until interrupted)
    pub messages: u64,
    /// Children wired to the pipe
    pub consumers: usize,
    /// Upstream sources contributing to every message
    pub sources: usize,
    /// Commit every N forwarded messages
    pub commit_every: u64,
    /// Make the last child fail every N messages (None = never)
    pub fail_every: Option<u64>,
    /// Payload size in bytes
    pub payload_bytes: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            messages: 10_000,
            consumers: 3,
            sources: 2,
            commit_every: 1,
            fail_every: None,
            payload_bytes: 256,
        }
    }
}
