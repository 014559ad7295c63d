//! `run` command implementation.

use std::path::Path;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use contracts::RuntimeConfig;
use tracing::{info, warn};

use crate::bench::Bench;
use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_bench(args: &RunArgs, mut config: RuntimeConfig) -> Result<()> {
    match &args.config {
        Some(path) => info!(config = %path.display(), "Configuration loaded"),
        None => info!("No configuration file given, using defaults"),
    }

    // Apply CLI overrides
    if let Some(messages) = args.messages {
        info!(messages = messages, "Overriding message count from CLI");
        config.bench.messages = messages;
    }
    if let Some(consumers) = args.consumers {
        info!(consumers = consumers, "Overriding consumer count from CLI");
        config.bench.consumers = consumers;
    }
    if let Some(interval) = args.report_interval_ms {
        info!(report_interval_ms = interval, "Overriding reporting window from CLI");
        config.monitor.report_interval_ms = interval;
    }
    if let Some(port) = args.metrics_port {
        config.observability.metrics_port = Some(port);
    }
    config_loader::ConfigLoader::validate(&config).map_err(CliError::from)?;

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if let Some(port) = config.observability.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let bench = Bench::new(config);
    let stop = bench.stop_handle();
    let run = bench.run();
    tokio::pin!(run);

    // Run bench with shutdown signal
    let stats = tokio::select! {
        result = &mut run => result?,
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping bench...");
            stop.store(true, Ordering::Relaxed);
            run.await?
        }
    };

    info!(
        messages = stats.messages,
        forward_failures = stats.forward_failures,
        duration_secs = stats.duration.as_secs_f64(),
        throughput = format!("{:.2}", stats.throughput()),
        "Bench completed"
    );
    stats.print_summary();

    Ok(())
}

/// Load configuration from `path`, or defaults when no path is given
///
/// Runs before the subscriber is installed, so it does not log.
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let Some(path) = path else {
        return Ok(RuntimeConfig::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &RuntimeConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Observability:");
    println!("  Log format: {:?}", config.observability.log_format);
    println!("  Log level: {}", config.observability.log_level);
    match config.observability.metrics_port {
        Some(port) => println!("  Metrics port: {}", port),
        None => println!("  Metrics port: disabled"),
    }
    println!("\nMonitor:");
    println!("  Report interval: {}ms", config.monitor.report_interval_ms);
    println!("\nBench:");
    if config.bench.messages == 0 {
        println!("  Messages: unlimited");
    } else {
        println!("  Messages: {}", config.bench.messages);
    }
    println!("  Consumers: {}", config.bench.consumers);
    println!("  Sources: {}", config.bench.sources);
    println!("  Commit every: {}", config.bench.commit_every);
    if let Some(every) = config.bench.fail_every {
        println!("  Fail every: {}", every);
    }
    println!();
}
