//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route; they all share one provider.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::domains::finance::MarketDataProvider;

use super::definitions::{
    FinancialStatementTool, HistoricalPricesTool, HolderInfoTool, NewsTool, RecommendationsTool,
    StockActionsTool, StockInfoTool,
};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(provider: Arc<dyn MarketDataProvider>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(HistoricalPricesTool::create_route(provider.clone()))
        .with_route(StockInfoTool::create_route(provider.clone()))
        .with_route(NewsTool::create_route(provider.clone()))
        .with_route(StockActionsTool::create_route(provider.clone()))
        .with_route(FinancialStatementTool::create_route(provider.clone()))
        .with_route(HolderInfoTool::create_route(provider.clone()))
        .with_route(RecommendationsTool::create_route(provider))
}
