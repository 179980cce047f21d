//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies, providing consistent error handling
//! across the entire application.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// Error originating from the upstream market-data provider.
    #[error("Provider error: {0}")]
    Provider(#[from] crate::domains::finance::ProviderError),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::finance::ProviderError;

    #[test]
    fn test_provider_error_converts() {
        let err: Error = ProviderError::auth("no crumb").into();
        assert_eq!(
            err.to_string(),
            "Provider error: authentication failed: no crumb"
        );
    }

    #[test]
    fn test_tool_error_converts() {
        let err: Error = crate::domains::tools::ToolError::not_found("XYZ").into();
        assert!(matches!(err, Error::Tool(_)));
    }
}
