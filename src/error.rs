//! Error types for the Sylius MCP server

use thiserror::Error;

/// Result type alias for catalog and dispatch operations
pub type Result<T> = std::result::Result<T, SyliusError>;

/// Main error type
#[derive(Error, Debug)]
pub enum SyliusError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    #[error("Method '{0}' not supported")]
    UnknownMethod(String),

    #[error("Parameter '{0}' is required")]
    MissingArgument(String),

    #[error("Parameter '{name}' must be of type {expected}")]
    InvalidArgument { name: String, expected: String },

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyliusError {
    /// Get error code for the JSON-RPC envelope
    pub fn code(&self) -> i64 {
        match self {
            SyliusError::UnknownTool(_) | SyliusError::UnknownMethod(_) => -32601,
            SyliusError::MissingArgument(_) | SyliusError::InvalidArgument { .. } => -32602,
            _ => -32000,
        }
    }

    /// Stable machine-readable kind, used in transport-neutral envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            SyliusError::UnknownTool(_) => "unknown_tool",
            SyliusError::UnknownMethod(_) => "unknown_method",
            SyliusError::MissingArgument(_) => "missing_argument",
            SyliusError::InvalidArgument { .. } => "invalid_argument",
            SyliusError::StoreUnavailable(_) => "store_unavailable",
            _ => "tool_execution_error",
        }
    }

    /// Whether the error comes from request validation rather than execution
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SyliusError::MissingArgument(_) | SyliusError::InvalidArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SyliusError::UnknownTool("x".into()).code(), -32601);
        assert_eq!(SyliusError::UnknownMethod("x".into()).code(), -32601);
        assert_eq!(SyliusError::MissingArgument("code".into()).code(), -32602);
        assert_eq!(
            SyliusError::InvalidArgument {
                name: "limit".into(),
                expected: "integer".into()
            }
            .code(),
            -32602
        );
        assert_eq!(SyliusError::ToolExecution("boom".into()).code(), -32000);
        assert_eq!(SyliusError::StoreUnavailable("gone".into()).code(), -32000);
    }

    #[test]
    fn test_missing_argument_message_names_parameter() {
        let err = SyliusError::MissingArgument("query".into());
        assert_eq!(err.to_string(), "Parameter 'query' is required");
        assert!(err.is_validation());
        assert_eq!(err.kind(), "missing_argument");
    }
}
