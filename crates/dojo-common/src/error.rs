//! Error types for the dojo apps and services

use thiserror::Error;

/// Result type alias for dojo operations
pub type DojoResult<T> = Result<T, DojoError>;

/// Errors that can occur across the dojo apps and services
#[derive(Error, Debug)]
pub enum DojoError {
    #[error("asset load failed: {0}")]
    AssetLoad(String),

    #[error("settings call failed: {0}")]
    Settings(String),

    #[error("host error: {0}")]
    Host(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
