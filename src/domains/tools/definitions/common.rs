//! Helpers shared by every finance tool: ticker resolution and result shaping.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domains::finance::{Instrument, MarketDataProvider};
use crate::domains::tools::ToolError;

/// Resolve a ticker before any data is fetched.
///
/// Resolution is repeated on every call; nothing is memoized.
pub async fn resolve(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    action: &'static str,
) -> Result<Instrument, ToolError> {
    match provider.lookup(ticker).await {
        Ok(Some(instrument)) => {
            debug!("Resolved {} to {}", ticker, instrument);
            Ok(instrument)
        }
        Ok(None) => Err(ToolError::not_found(ticker)),
        Err(e) => Err(ToolError::provider(action, ticker, e)),
    }
}

/// Log a tool failure and return it as the call's text result.
pub fn error_result(err: &ToolError) -> CallToolResult {
    let message = err.to_string();
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message)])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Serialize a tool payload as compact JSON text.
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string(value)?)
}

/// Fold a tool body's outcome into the result handed back to the host.
pub fn into_result(outcome: Result<String, ToolError>) -> CallToolResult {
    match outcome {
        Ok(text) => success_result(text),
        Err(e) => error_result(&e),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{is_error, text_of};
    use super::*;
    use crate::domains::finance::provider::fixture::FixtureProvider;

    #[tokio::test]
    async fn test_resolve_known_ticker() {
        let provider = FixtureProvider::knowing("AAPL");
        let instrument = resolve(&provider, "AAPL", "getting news").await.unwrap();
        assert_eq!(instrument.symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_resolve_unknown_ticker() {
        let provider = FixtureProvider::knowing("AAPL");
        let err = resolve(&provider, "INVALIDTICKERXYZ", "getting news")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Company ticker INVALIDTICKERXYZ not found.");
    }

    #[tokio::test]
    async fn test_resolve_provider_failure() {
        let provider = FixtureProvider {
            fail_lookup: true,
            ..FixtureProvider::knowing("AAPL")
        };
        let err = resolve(&provider, "AAPL", "getting news").await.unwrap_err();
        assert!(err.to_string().starts_with("Error: getting news for AAPL: "));
    }

    #[test]
    fn test_error_result_is_flagged() {
        let result = error_result(&ToolError::not_found("XYZ"));
        assert!(is_error(&result));
        assert_eq!(text_of(&result), "Company ticker XYZ not found.");
    }

    #[test]
    fn test_into_result_success() {
        let result = into_result(Ok("[]".to_string()));
        assert!(!is_error(&result));
        assert_eq!(text_of(&result), "[]");
    }
}
