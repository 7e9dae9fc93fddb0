//! Error types shared across Lingocast crates.

use std::path::PathBuf;

/// Top-level error type for Lingocast operations.
#[derive(Debug, thiserror::Error)]
pub enum LingocastError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Schema error at {field}: {message}")]
    Schema { field: String, message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Markup error: {message}")]
    Markup { message: String },

    #[error("Timing error: {message}")]
    Timing { message: String },

    #[error("Sequencing error: {message}")]
    Sequencing { message: String },

    #[error("Backend failure: {message}")]
    Backend { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using LingocastError.
pub type LingocastResult<T> = Result<T, LingocastError>;

impl LingocastError {
    pub fn malformed_input(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
        }
    }

    pub fn schema(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn timing(msg: impl Into<String>) -> Self {
        Self::Timing {
            message: msg.into(),
        }
    }

    pub fn sequencing(msg: impl Into<String>) -> Self {
        Self::Sequencing {
            message: msg.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
