//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::ObservabilitySettings;
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// Pipe Bench - drive an in-memory stage through a ProcessorPipe
#[derive(Parser, Debug)]
#[command(
    name = "pipe-bench",
    author,
    version,
    about = "Stream pipe routing and commit bench",
    long_about = "Drives synthetic messages through a ProcessorPipe wired to in-memory \n\
                  consumers and sources, reporting the time spent routing and committing \n\
                  per reporting window."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PIPE_BENCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (overrides `[observability] log_format`)
    #[arg(long, value_enum, global = true, env = "PIPE_BENCH_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup from `[observability]`, with `--log-format`, `-v` and `-q` taking priority
    ///
    /// The Prometheus exporter is left to `run`, which installs it once the
    /// overrides are applied.
    pub fn observability_config(&self, settings: &ObservabilitySettings) -> ObservabilityConfig {
        let mut config = ObservabilityConfig::from(settings);
        config.metrics_port = None;

        if let Some(format) = self.log_format {
            config.log_format = format.into();
        }

        if self.quiet {
            config.default_log_level = "warn".to_string();
        } else if self.verbose > 0 {
            let level = if self.verbose == 1 { "debug" } else { "trace" };
            config.default_log_level = level.to_string();
        }

        config
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bench stage
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "PIPE_BENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override number of messages (0 = until interrupted)
    #[arg(long, env = "PIPE_BENCH_MESSAGES")]
    pub messages: Option<u64>,

    /// Override number of consumers wired to the pipe
    #[arg(long)]
    pub consumers: Option<usize>,

    /// Override reporting window in milliseconds
    #[arg(long)]
    pub report_interval_ms: Option<u64>,

    /// Metrics server port (overrides configuration)
    #[arg(long, env = "PIPE_BENCH_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "pipe.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for contracts::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => contracts::LogFormat::Json,
            LogFormat::Pretty => contracts::LogFormat::Pretty,
            LogFormat::Compact => contracts::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::parse_from([
            "pipe-bench",
            "--log-format",
            "compact",
            "run",
            "--messages",
            "42",
            "--consumers",
            "5",
        ]);
        assert!(matches!(cli.log_format, Some(LogFormat::Compact)));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.messages, Some(42));
                assert_eq!(args.consumers, Some(5));
                assert!(args.config.is_none());
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate_defaults() {
        let cli = Cli::parse_from(["pipe-bench", "validate"]);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.config, PathBuf::from("pipe.toml"));
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn settings_from_toml(toml: &str) -> ObservabilitySettings {
        config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
            .unwrap()
            .observability
    }

    #[test]
    fn test_config_file_drives_logging() {
        let settings = settings_from_toml(
            r#"
[observability]
log_format = "compact"
log_level = "debug"
metrics_port = 9100
"#,
        );
        let cli = Cli::parse_from(["pipe-bench", "run"]);

        let config = cli.observability_config(&settings);
        assert_eq!(config.log_format, contracts::LogFormat::Compact);
        assert_eq!(config.default_log_level, "debug");
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_flags_override_config_logging() {
        let settings = settings_from_toml(
            r#"
[observability]
log_format = "compact"
log_level = "debug"
"#,
        );

        let cli = Cli::parse_from(["pipe-bench", "--log-format", "json", "-vv", "run"]);
        let config = cli.observability_config(&settings);
        assert_eq!(config.log_format, contracts::LogFormat::Json);
        assert_eq!(config.default_log_level, "trace");

        let cli = Cli::parse_from(["pipe-bench", "-q", "run"]);
        let config = cli.observability_config(&settings);
        assert_eq!(config.log_format, contracts::LogFormat::Compact);
        assert_eq!(config.default_log_level, "warn");
    }
}
