//! Layered error definitions
//!
//! Categorized by source: config / routing / commit

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Routing Errors =====
    /// `forward_to` addressed a child that is not wired to the pipe
    #[error("child index {index} out of bounds for pipe with {len} children")]
    ChildIndexOutOfBounds { index: usize, len: usize },

    /// Downstream pump rejected a message
    #[error("pump '{node}' process error: {message}")]
    Process { node: String, message: String },

    // ===== Commit Errors =====
    /// Upstream source failed to acknowledge a token
    #[error("source '{source_name}' commit error: {message}")]
    Commit {
        source_name: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create child index out of bounds error
    pub fn child_out_of_bounds(index: usize, len: usize) -> Self {
        Self::ChildIndexOutOfBounds { index, len }
    }

    /// Create pump process error
    pub fn process(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Process {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create source commit error
    pub fn commit(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Commit {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
