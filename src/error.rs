//! Error types for validation runs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Execution error: {message}")]
    Execution { message: String },

    #[error("Expected output file not found: {path}")]
    MissingOutput { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidationError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution {
            message: msg.into(),
        }
    }

    pub fn missing_output(path: impl Into<PathBuf>) -> Self {
        Self::MissingOutput { path: path.into() }
    }
}
