//! Error types for plan ingestion

use thiserror::Error;

/// Errors that can occur when ingesting plan text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExplainError {
    #[error("Execution plan text is empty")]
    EmptyInput,

    #[error("Malformed plan payload: {0}")]
    MalformedInput(String),
}

impl ExplainError {
    /// Structured payload decoded but has no root plan section
    pub fn missing_plan() -> Self {
        Self::MalformedInput("JSON plan missing Plan section".into())
    }
}

impl From<serde_json::Error> for ExplainError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(format!("unable to decode JSON plan: {err}"))
    }
}

/// Result type for plan ingestion
pub type Result<T> = std::result::Result<T, ExplainError>;
