//! Upstream provider error types.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised while talking to the upstream market-data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// The provider is throttling us.
    #[error("rate limited by {0}")]
    RateLimited(String),

    /// Cookie or crumb could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider reported an error inside an otherwise valid payload.
    #[error("{code}: {description}")]
    Upstream { code: String, description: String },

    /// The payload did not have the expected shape.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Create a status error.
    pub fn status(status: u16, endpoint: impl Into<String>) -> Self {
        Self::Status {
            status,
            endpoint: endpoint.into(),
        }
    }

    /// Create an upstream-reported error.
    pub fn upstream(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Upstream {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Whether retrying with fresh credentials may help.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
