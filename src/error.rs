use std::path::PathBuf;

use thiserror::Error;

/// Main error type for docsynth operations
#[derive(Error, Debug)]
pub enum DocsynthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Failed to analyze {}: {message}", path.display())]
    Analysis { path: PathBuf, message: String },

    #[error("Run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DocsynthError>;
