//! # Pipe Bench CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 内存 stage 压测 (ProcessorPipe + PipeMonitor)
//! - 优雅关闭处理

mod bench;
mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{load_config, run_bench, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // `run` loads its configuration first so `[observability]` can shape logging
    let config = match &cli.command {
        Commands::Run(args) => Some(load_config(args.config.as_deref())?),
        Commands::Validate(_) => None,
    };

    let settings = config
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_default();
    observability::init_with_config(cli.observability_config(&settings))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Pipe bench starting");

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_bench(args, config.unwrap_or_default()).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
