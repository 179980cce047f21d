//! Financial statement tool.
//!
//! The statement kind selects exactly one provider accessor; the resulting
//! table is emitted one record per reporting date, `date` first.

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
use crate::domains::finance::{FinancialType, MarketDataProvider};
use crate::domains::tools::ToolError;

const ACTION: &str = "getting financial statement";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FinancialStatementParams {
    #[schemars(description = "The ticker symbol of the stock to get financial statement for, e.g. \"AAPL\"")]
    pub ticker: String,

    #[schemars(
        description = "The type of financial statement to get: income_stmt, quarterly_income_stmt, balance_sheet, quarterly_balance_sheet, cashflow, quarterly_cashflow"
    )]
    pub financial_type: String,
}

#[derive(Debug, Clone)]
pub struct FinancialStatementTool;

impl FinancialStatementTool {
    pub const NAME: &'static str = "get_financial_statement";

    pub const DESCRIPTION: &'static str = "Get financial statement for a given ticker symbol from yahoo finance. You can choose from the following financial statement types: income_stmt, quarterly_income_stmt, balance_sheet, quarterly_balance_sheet, cashflow, quarterly_cashflow.";

    #[instrument(skip_all, fields(ticker = %params.ticker, financial_type = %params.financial_type))]
    pub async fn execute(
        params: &FinancialStatementParams,
        provider: &dyn MarketDataProvider,
    ) -> CallToolResult {
        into_result(Self::run(params, provider).await)
    }

    async fn run(
        params: &FinancialStatementParams,
        provider: &dyn MarketDataProvider,
    ) -> Result<String, ToolError> {
        let kind: FinancialType = params.financial_type.parse()?;
        let instrument = resolve(provider, &params.ticker, ACTION).await?;

        let table = provider
            .financial_statement(&instrument.symbol, kind)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        info!(
            "{} for {}: {} metrics over {} periods",
            kind,
            instrument.symbol,
            table.metrics().len(),
            table.columns().len()
        );
        to_json_text(&table.to_records())
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<FinancialStatementParams>(),
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
                let params: FinancialStatementParams =
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
    use crate::domains::finance::{Cell, ColumnKey, TimeSeriesTable};
    use crate::domains::tools::definitions::common::test_support::{is_error, text_of};
    use chrono::NaiveDate;
    use serde_json::Value;

    fn params(ticker: &str, financial_type: &str) -> FinancialStatementParams {
        FinancialStatementParams {
            ticker: ticker.to_string(),
            financial_type: financial_type.to_string(),
        }
    }

    fn income_statement() -> TimeSeriesTable {
        let date = |y, m, d| ColumnKey::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        let mut table = TimeSeriesTable::new(vec![date(2024, 9, 30), date(2023, 9, 30)]);
        table.push_metric("TotalRevenue", vec![Cell::Float(391035e6), Cell::Float(383285e6)]);
        table.push_metric("NetIncome", vec![Cell::Float(93736e6), Cell::Float(f64::NAN)]);
        table
    }

    #[tokio::test]
    async fn test_each_kind_calls_its_accessor_once() {
        for kind in FinancialType::ALL {
            let provider = FixtureProvider::knowing("AAPL");
            let result =
                FinancialStatementTool::execute(&params("AAPL", kind.as_str()), &provider).await;
            assert!(!is_error(&result));

            let calls = provider.calls();
            let statement_calls: Vec<_> =
                calls.iter().filter(|c| c.starts_with("statement:")).collect();
            assert_eq!(statement_calls, vec![&format!("statement:{kind}")]);
        }
    }

    #[tokio::test]
    async fn test_records_per_date() {
        let mut provider = FixtureProvider::knowing("AAPL");
        provider
            .statements
            .insert(FinancialType::IncomeStmt, income_statement());

        let result = FinancialStatementTool::execute(&params("AAPL", "income_stmt"), &provider).await;
        let records: Vec<serde_json::Map<String, Value>> =
            serde_json::from_str(text_of(&result)).unwrap();

        assert_eq!(records.len(), 2);
        let keys: Vec<_> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["date", "TotalRevenue", "NetIncome"]);
        assert_eq!(records[0]["date"], "2024-09-30");
        assert_eq!(records[1]["date"], "2023-09-30");
        assert_eq!(records[1]["NetIncome"], Value::Null);
    }

    #[tokio::test]
    async fn test_empty_statement_is_empty_array() {
        let provider = FixtureProvider::knowing("AAPL");
        let result =
            FinancialStatementTool::execute(&params("AAPL", "quarterly_cashflow"), &provider).await;
        assert!(!is_error(&result));
        assert_eq!(text_of(&result), "[]");
    }

    #[tokio::test]
    async fn test_invalid_type_lists_all_kinds() {
        let provider = FixtureProvider::knowing("AAPL");
        let result = FinancialStatementTool::execute(&params("AAPL", "10-K"), &provider).await;
        assert!(is_error(&result));
        assert_eq!(
            text_of(&result),
            "Error: invalid financial type 10-K. Please use one of the following: income_stmt, \
             quarterly_income_stmt, balance_sheet, quarterly_balance_sheet, cashflow, \
             quarterly_cashflow."
        );
        assert!(!provider.calls().iter().any(|c| c.starts_with("statement:")));
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = FixtureProvider::knowing("AAPL");
        let result =
            FinancialStatementTool::execute(&params("INVALIDTICKERXYZ", "cashflow"), &provider).await;
        assert_eq!(text_of(&result), "Company ticker INVALIDTICKERXYZ not found.");
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = FixtureProvider {
            fail_fetch: true,
            ..FixtureProvider::knowing("AAPL")
        };
        let result = FinancialStatementTool::execute(&params("AAPL", "balance_sheet"), &provider).await;
        assert!(text_of(&result).starts_with("Error: getting financial statement for AAPL: "));
    }
}
