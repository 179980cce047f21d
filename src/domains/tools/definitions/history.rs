//! Historical price tool.
//!
//! Returns one record per bar: `Date` (ISO-8601) first, then
//! `Open, High, Low, Close, Volume, Dividends, Stock Splits`.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{into_result, resolve, to_json_text};
use crate::domains::finance::{Interval, MarketDataProvider, Period};
use crate::domains::tools::ToolError;

const ACTION: &str = "getting historical stock prices";

fn default_period() -> String {
    Period::default().as_str().to_string()
}

fn default_interval() -> String {
    Interval::default().as_str().to_string()
}

/// Parameters for the historical price tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HistoryParams {
    #[schemars(description = "The ticker symbol of the stock, e.g. \"AAPL\"")]
    pub ticker: String,

    #[schemars(description = "Valid periods: 1d,5d,1mo,3mo,6mo,1y,2y,5y,10y,ytd,max. Default is \"1mo\"")]
    #[serde(default = "default_period")]
    pub period: String,

    #[schemars(
        description = "Valid intervals: 1m,2m,5m,15m,30m,60m,90m,1h,1d,5d,1wk,1mo,3mo. Intraday data cannot extend last 60 days. Default is \"1d\""
    )]
    #[serde(default = "default_interval")]
    pub interval: String,
}

#[derive(Debug, Clone)]
pub struct HistoricalPricesTool;

impl HistoricalPricesTool {
    pub const NAME: &'static str = "get_historical_stock_prices";

    pub const DESCRIPTION: &'static str = "Get historical stock prices for a given ticker symbol from yahoo finance. Include the following information: Date, Open, High, Low, Close, Volume, Dividends, Stock Splits. Prices are split and dividend adjusted.";

    #[instrument(skip_all, fields(ticker = %params.ticker))]
    pub async fn execute(params: &HistoryParams, provider: &dyn MarketDataProvider) -> CallToolResult {
        into_result(Self::run(params, provider).await)
    }

    async fn run(params: &HistoryParams, provider: &dyn MarketDataProvider) -> Result<String, ToolError> {
        let period: Period = params.period.parse()?;
        let interval: Interval = params.interval.parse()?;

        let instrument = resolve(provider, &params.ticker, ACTION).await?;
        info!("Fetching {} of {} bars for {}", period, interval, instrument.symbol);

        let table = provider
            .history(&instrument.symbol, period, interval)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        to_json_text(&table.to_records())
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<HistoryParams>(),
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
                let params: HistoryParams =
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
    use serde_json::Value;

    fn params(ticker: &str) -> HistoryParams {
        serde_json::from_value(serde_json::json!({ "ticker": ticker })).unwrap()
    }

    fn provider_with_bars() -> FixtureProvider {
        let mut history = RowTable::with_index(
            "Date",
            ["Open", "High", "Low", "Close", "Volume", "Dividends", "Stock Splits"],
        );
        history.push_row(
            Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap(),
            vec![
                Cell::Float(169.58),
                Cell::Float(172.71),
                Cell::Float(169.11),
                Cell::Float(f64::NAN),
                Cell::Int(50_383_100),
                Cell::Float(0.0),
                Cell::Float(0.0),
            ],
        );
        FixtureProvider {
            history,
            ..FixtureProvider::knowing("AAPL")
        }
    }

    #[test]
    fn test_params_defaults() {
        let params = params("AAPL");
        assert_eq!(params.period, "1mo");
        assert_eq!(params.interval, "1d");
    }

    #[tokio::test]
    async fn test_history_records() {
        let provider = provider_with_bars();
        let result = HistoricalPricesTool::execute(&params("AAPL"), &provider).await;
        assert!(!is_error(&result));

        let records: Vec<serde_json::Map<String, Value>> =
            serde_json::from_str(text_of(&result)).unwrap();
        assert_eq!(records.len(), 1);
        let keys: Vec<_> = records[0].keys().map(String::as_str).collect();
        assert_eq!(&keys[..6], &["Date", "Open", "High", "Low", "Close", "Volume"]);
        assert_eq!(records[0]["Date"], "2024-05-01T13:30:00.000Z");
        assert_eq!(records[0]["Close"], Value::Null);
        assert_eq!(provider.calls(), vec!["lookup", "history:1mo:1d"]);
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = provider_with_bars();
        let result = HistoricalPricesTool::execute(&params("INVALIDTICKERXYZ"), &provider).await;
        assert!(is_error(&result));
        assert_eq!(text_of(&result), "Company ticker INVALIDTICKERXYZ not found.");
        assert_eq!(provider.calls(), vec!["lookup"]);
    }

    #[tokio::test]
    async fn test_invalid_period_is_rejected_before_lookup() {
        let provider = provider_with_bars();
        let params = HistoryParams {
            period: "2w".into(),
            ..params("AAPL")
        };
        let result = HistoricalPricesTool::execute(&params, &provider).await;
        assert!(is_error(&result));
        assert_eq!(
            text_of(&result),
            "Error: invalid period 2w. Please use one of the following: \
             1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max."
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_interval() {
        let provider = provider_with_bars();
        let params = HistoryParams {
            interval: "4h".into(),
            ..params("AAPL")
        };
        let result = HistoricalPricesTool::execute(&params, &provider).await;
        assert!(text_of(&result).starts_with("Error: invalid interval 4h."));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = FixtureProvider {
            fail_fetch: true,
            ..provider_with_bars()
        };
        let result = HistoricalPricesTool::execute(&params("AAPL"), &provider).await;
        assert!(is_error(&result));
        assert_eq!(
            text_of(&result),
            "Error: getting historical stock prices for AAPL: HTTP 500 from fixture"
        );
    }

    #[test]
    fn test_to_tool() {
        let tool = HistoricalPricesTool::to_tool();
        assert_eq!(tool.name, "get_historical_stock_prices");
        let props = tool.input_schema.get("properties").unwrap();
        assert!(props.get("period").is_some());
    }
}
