//! Bench orchestrator - owns the stage worker and its stop flag.
//!
//! The pipe is synchronous and blocking, so the stage runs on a blocking
//! worker thread that owns it exclusively.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use contracts::RuntimeConfig;
use tracing::info;

use super::stage::{BenchStage, STAGE_NAME};
use super::BenchStats;
use crate::error::CliError;

/// Bench runner
pub struct Bench {
    config: RuntimeConfig,
    stop: Arc<AtomicBool>,
}

impl Bench {
    /// Create a bench with the given configuration
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that makes the worker finish after the current message
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run the stage to completion
    pub async fn run(self) -> Result<BenchStats, CliError> {
        let bench = self.config.bench.clone();
        let report_interval = self.config.monitor.report_interval();

        info!(
            stage = STAGE_NAME,
            messages = bench.messages,
            consumers = bench.consumers,
            sources = bench.sources,
            report_interval_ms = self.config.monitor.report_interval_ms,
            "Starting bench stage"
        );

        let stop = self.stop;
        tokio::task::spawn_blocking(move || BenchStage::new(bench, report_interval).run(&stop))
            .await
            .map_err(|e| CliError::bench_execution(e.to_string()))
    }
}
