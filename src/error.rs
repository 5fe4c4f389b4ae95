//! Error types for running an analysis.

use apitrail_core::StoreError;
use thiserror::Error;

/// Errors that can occur when configuring or running an analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
