//! Tool-specific error types.
//!
//! The `Display` output of every variant is the exact text returned to the
//! caller, so hosts that only read text content see the same contract.

use thiserror::Error;

use crate::domains::finance::{ProviderError, UnknownVariant};

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The ticker does not resolve upstream.
    #[error("Company ticker {ticker} not found.")]
    NotFound { ticker: String },

    /// The upstream fetch or its decoding failed.
    #[error("Error: {action} for {ticker}: {source}")]
    Provider {
        action: &'static str,
        ticker: String,
        #[source]
        source: ProviderError,
    },

    /// An enumerated parameter is outside its accepted values.
    #[error("Error: {0}")]
    InvalidParameter(#[from] UnknownVariant),

    /// The result could not be serialized.
    #[error("Error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(ticker: impl Into<String>) -> Self {
        Self::NotFound {
            ticker: ticker.into(),
        }
    }

    /// Wrap a provider failure with the action being performed.
    pub fn provider(action: &'static str, ticker: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider {
            action,
            ticker: ticker.into(),
            source,
        }
    }
}
