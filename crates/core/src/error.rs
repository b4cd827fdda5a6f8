//! Error types for the fieldbook domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error enum; the recoverable ones (tool resolution, tool
//! execution, field validation) are surfaced to the model as result text
//! and never abort the loop, while provider failures propagate to the
//! caller.

use thiserror::Error;

/// The top-level error type for all fieldbook operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Model backend failures. Fatal to a loop run.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Malformed provider response: {0}")]
    ResponseFormat(String),
}

/// Tool contract violations and execution failures. Recoverable: the
/// orchestrator converts these into error-string tool results.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool '{0}'")]
    NotFound(String),

    #[error("A tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("{reason}")]
    ExecutionFailed { reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }
}

/// Field registry errors. Recoverable: returned as the write_field tool's
/// result text so the model can self-correct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Field '{0}' does not exist")]
    UnknownField(String),

    #[error("Value cannot be empty for field '{0}'")]
    Empty(String),

    #[error("Invalid value for field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}
