//! Corporate actions tool: every dividend and split, oldest first.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::instrument;

use super::common::{into_result, resolve, to_json_text};
use crate::domains::finance::MarketDataProvider;
use crate::domains::tools::ToolError;

const ACTION: &str = "getting stock actions";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockActionsParams {
    #[schemars(description = "The ticker symbol of the stock to get stock actions for, e.g. \"AAPL\"")]
    pub ticker: String,
}

#[derive(Debug, Clone)]
pub struct StockActionsTool;

impl StockActionsTool {
    pub const NAME: &'static str = "get_stock_actions";

    pub const DESCRIPTION: &'static str =
        "Get stock dividends and stock splits for a given ticker symbol from yahoo finance.";

    #[instrument(skip_all, fields(ticker = %params.ticker))]
    pub async fn execute(params: &StockActionsParams, provider: &dyn MarketDataProvider) -> CallToolResult {
        into_result(Self::run(params, provider).await)
    }

    async fn run(params: &StockActionsParams, provider: &dyn MarketDataProvider) -> Result<String, ToolError> {
        let instrument = resolve(provider, &params.ticker, ACTION).await?;

        let table = provider
            .actions(&instrument.symbol)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        to_json_text(&table.to_records())
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<StockActionsParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(provider: Arc<dyn MarketDataProvider>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let provider = provider.clone();
            async move {
                let params: StockActionsParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, provider.as_ref()).await)
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::finance::provider::fixture::FixtureProvider;
    use crate::domains::finance::{Cell, RowTable};
    use crate::domains::tools::definitions::common::test_support::{is_error, text_of};
    use chrono::{TimeZone, Utc};

    fn params(ticker: &str) -> StockActionsParams {
        StockActionsParams {
            ticker: ticker.to_string(),
        }
    }

    #[tokio::test]
    async fn test_actions_records() {
        let mut actions = RowTable::with_index("Date", ["Dividends", "Stock Splits"]);
        actions.push_row(
            Utc.with_ymd_and_hms(2020, 8, 31, 4, 0, 0).unwrap(),
            vec![Cell::Float(0.0), Cell::Float(4.0)],
        );
        let provider = FixtureProvider {
            actions,
            ..FixtureProvider::knowing("AAPL")
        };

        let result = StockActionsTool::execute(&params("AAPL"), &provider).await;
        assert!(!is_error(&result));
        assert_eq!(
            text_of(&result),
            r#"[{"Date":"2020-08-31T04:00:00.000Z","Dividends":0.0,"Stock Splits":4.0}]"#
        );
    }

    #[tokio::test]
    async fn test_no_actions_is_empty_array() {
        let provider = FixtureProvider::knowing("AAPL");
        let result = StockActionsTool::execute(&params("AAPL"), &provider).await;
        assert_eq!(text_of(&result), "[]");
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = FixtureProvider::knowing("AAPL");
        let result = StockActionsTool::execute(&params("INVALIDTICKERXYZ"), &provider).await;
        assert!(is_error(&result));
        assert_eq!(text_of(&result), "Company ticker INVALIDTICKERXYZ not found.");
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = FixtureProvider {
            fail_fetch: true,
            ..FixtureProvider::knowing("AAPL")
        };
        let result = StockActionsTool::execute(&params("AAPL"), &provider).await;
        assert!(text_of(&result).starts_with("Error: getting stock actions for AAPL: "));
    }
}
