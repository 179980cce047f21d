//! Tool Registry - name-based dispatch for transports that do not go through
//! rmcp's service loop (the HTTP JSON-RPC endpoint).

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domains::finance::MarketDataProvider;

use super::definitions::{
    FinancialStatementTool, HistoricalPricesTool, HolderInfoTool, NewsTool, RecommendationsTool,
    StockActionsTool, StockInfoTool,
};

fn parse<P: DeserializeOwned>(arguments: serde_json::Value) -> Result<P, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::invalid_params(e.to_string(), None))
}

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    provider: Arc<dyn MarketDataProvider>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            HistoricalPricesTool::NAME,
            StockInfoTool::NAME,
            NewsTool::NAME,
            StockActionsTool::NAME,
            FinancialStatementTool::NAME,
            HolderInfoTool::NAME,
            RecommendationsTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            HistoricalPricesTool::to_tool(),
            StockInfoTool::to_tool(),
            NewsTool::to_tool(),
            StockActionsTool::to_tool(),
            FinancialStatementTool::to_tool(),
            HolderInfoTool::to_tool(),
            RecommendationsTool::to_tool(),
        ]
    }

    /// Dispatch a tool call by name.
    ///
    /// Malformed arguments and unknown tools are protocol errors; every
    /// failure inside a tool comes back as an error-flagged result instead.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, McpError> {
        let provider = self.provider.as_ref();
        let result = match name {
            HistoricalPricesTool::NAME => {
                HistoricalPricesTool::execute(&parse(arguments)?, provider).await
            }
            StockInfoTool::NAME => StockInfoTool::execute(&parse(arguments)?, provider).await,
            NewsTool::NAME => NewsTool::execute(&parse(arguments)?, provider).await,
            StockActionsTool::NAME => StockActionsTool::execute(&parse(arguments)?, provider).await,
            FinancialStatementTool::NAME => {
                FinancialStatementTool::execute(&parse(arguments)?, provider).await
            }
            HolderInfoTool::NAME => HolderInfoTool::execute(&parse(arguments)?, provider).await,
            RecommendationsTool::NAME => {
                RecommendationsTool::execute(&parse(arguments)?, provider).await
            }
            _ => {
                warn!("Unknown tool requested: {}", name);
                return Err(McpError::invalid_params(format!("Unknown tool: {name}"), None));
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::finance::provider::fixture::FixtureProvider;
    use crate::domains::tools::build_tool_router;
    use rmcp::handler::server::tool::ToolRouter;
    use rmcp::model::RawContent;
    use serde_json::json;

    struct TestServer {}

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(FixtureProvider::knowing("AAPL")))
    }

    #[test]
    fn test_registry_matches_router() {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(FixtureProvider::default());
        let router: ToolRouter<TestServer> = build_tool_router(provider.clone());
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        let registry = ToolRegistry::new(provider);
        let registry_names = registry.tool_names();
        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
        assert_eq!(ToolRegistry::get_all_tools().len(), router_names.len());
    }

    #[test]
    fn test_call_tool_dispatches_by_name() {
        let result = tokio_test::block_on(
            registry().call_tool("get_stock_actions", json!({ "ticker": "AAPL" })),
        )
        .unwrap();
        assert!(!result.is_error.unwrap_or(false));
        if let RawContent::Text(text) = &result.content[0].raw {
            assert_eq!(text.text, "[]");
        } else {
            panic!("Expected text content");
        }
    }

    #[tokio::test]
    async fn test_missing_ticker_is_invalid_params() {
        let err = registry()
            .call_tool("get_stock_info", json!({}))
            .await
            .unwrap_err();
        assert!(err.message.contains("ticker"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry()
            .call_tool("get_options_chain", json!({ "ticker": "AAPL" }))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Unknown tool: get_options_chain");
    }
}
