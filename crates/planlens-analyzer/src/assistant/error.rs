use thiserror::Error;

/// Errors raised while preparing a request or reading a response
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssistantError {
    #[error("Missing base URL")]
    MissingEndpoint,

    #[error("Analysis service is not configured: base URL, API key and model are required")]
    NotConfigured,

    #[error("Failed to encode analysis payload: {0}")]
    Encode(String),

    #[error("Invalid analysis response: {0}")]
    InvalidResponse(String),

    #[error("Analysis response carries no message content")]
    MissingContent,
}

pub type Result<T> = std::result::Result<T, AssistantError>;
