//! MCP Server implementation and lifecycle management.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (for rmcp)
//! - `execute()` method (core logic, against a [`MarketDataProvider`])
//! - `create_route()` (the rmcp route every transport dispatches through)
//!
//! The ToolRouter is built dynamically in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{
    ErrorData as McpError, ServerHandler, handler::server::tool::ToolRouter, model::*,
    tool_handler,
};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as CoreResult;
use crate::domains::finance::{MarketDataProvider, YahooProvider};
use crate::domains::tools::{ToolRegistry, build_tool_router};

/// Instructions advertised to clients during initialization.
pub const INSTRUCTIONS: &str = "\
# Yahoo Finance MCP Server

This server is used to get information about a given ticker symbol from yahoo finance.

Available tools:
- get_historical_stock_prices: Get historical stock prices for a given ticker symbol. Include the following information: Date, Open, High, Low, Close, Volume, Dividends, Stock Splits. period is one of 1d,5d,1mo,3mo,6mo,1y,2y,5y,10y,ytd,max (default 1mo); interval is one of 1m,2m,5m,15m,30m,60m,90m,1h,1d,5d,1wk,1mo,3mo (default 1d).
- get_stock_info: Get stock information for a given ticker symbol: company basics, valuation, growth, margins, financial health, dividend and basic technical metrics.
- get_yahoo_finance_news: Get news for a given ticker symbol.
- get_stock_actions: Get stock dividends and stock splits for a given ticker symbol.
- get_financial_statement: Get financial statement for a given ticker symbol. You can choose from the following financial statement types: income_stmt, quarterly_income_stmt, balance_sheet, quarterly_balance_sheet, cashflow, quarterly_cashflow.
- get_holder_info: Get holder information for a given ticker symbol. You can choose from the following holder types: major_holders, institutional_holders, mutualfund_holders, insider_transactions, insider_purchases, insider_roster_holders.
- get_recommendations: Get recommendations or upgrades/downgrades for a given ticker symbol. You can also specify the number of months back to get upgrades/downgrades for, default is 12.
";

/// The main MCP server handler.
///
/// Cheap to clone: the configuration and provider are shared, so every
/// transport session talks to the same upstream client.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Upstream market-data provider shared by every tool.
    provider: Arc<dyn MarketDataProvider>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server backed by Yahoo Finance.
    pub fn new(config: Config) -> CoreResult<Self> {
        let provider = YahooProvider::new(&config.provider)?;
        info!(
            "Yahoo Finance provider ready (timeout {}s)",
            config.provider.timeout_secs
        );
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create a server around an existing provider.
    pub fn with_provider(config: Config, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(provider.clone()),
            config: Arc::new(config),
            provider,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Names of every registered tool.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }

    /// Tool descriptors, as advertised by `tools/list`.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Call a tool by name outside of rmcp's service loop.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, McpError> {
        ToolRegistry::new(self.provider.clone())
            .call_tool(name, arguments)
            .await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::finance::provider::fixture::FixtureProvider;

    fn server() -> McpServer {
        McpServer::with_provider(Config::default(), Arc::new(FixtureProvider::knowing("AAPL")))
    }

    #[test]
    fn test_server_lists_seven_tools() {
        let names = server().tool_names();
        assert_eq!(names.len(), 7);
        assert!(names.iter().any(|n| n == "get_financial_statement"));
    }

    #[test]
    fn test_info_advertises_tools_only() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "yfinance");

        let instructions = info.instructions.unwrap();
        for name in server().tool_names() {
            assert!(instructions.contains(&name), "instructions miss {name}");
        }
    }

    fn assert_handler<H: ServerHandler + Clone>(_: &H) {}

    #[test]
    fn test_tool_handler_impl_and_constructor() {
        let server: CoreResult<McpServer> = McpServer::new(Config::default());
        let server = server.unwrap();
        assert_handler(&server);
        assert_eq!(server.list_tools().len(), server.tool_names().len());
    }

    #[tokio::test]
    async fn test_call_tool_by_name() {
        let result = server()
            .call_tool(
                "get_holder_info",
                serde_json::json!({ "ticker": "MSFT", "holder_type": "major_holders" }),
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(server().list_tools().len(), 7);
    }

    #[test]
    fn test_new_builds_yahoo_provider() {
        let server = McpServer::new(Config::default()).unwrap();
        assert_eq!(server.name(), "yfinance");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
    }
}
