//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration rejected by the loader
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Bench worker did not finish
    #[error("Bench execution failed: {message}")]
    BenchExecution { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn bench_execution(message: impl Into<String>) -> Self {
        Self::BenchExecution {
            message: message.into(),
        }
    }
}
