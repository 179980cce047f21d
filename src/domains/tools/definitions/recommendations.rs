//! Analyst recommendations tool.
//!
//! `recommendations` returns the provider's monthly trend rows untouched.
//! `upgrades_downgrades` keeps the last `months_back` months of grade changes,
//! newest first, one row per firm.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::common::{into_result, resolve, to_json_text};
use crate::domains::finance::{Cell, MarketDataProvider, RecommendationType, RowTable};
use crate::domains::tools::ToolError;

const ACTION: &str = "getting recommendations";

fn default_recommendation_type() -> String {
    RecommendationType::Recommendations.as_str().to_string()
}

fn default_months_back() -> u32 {
    12
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendationsParams {
    #[schemars(description = "The ticker symbol of the stock to get recommendations for, e.g. \"AAPL\"")]
    pub ticker: String,

    #[schemars(description = "One of: recommendations, upgrades_downgrades. Default is \"recommendations\"")]
    #[serde(default = "default_recommendation_type")]
    pub recommendation_type: String,

    #[schemars(description = "Months of upgrades/downgrades to include. Default is 12")]
    #[serde(default = "default_months_back")]
    pub months_back: u32,
}

/// Keep grades dated within `months_back` months of `now`, newest first,
/// and only the most recent grade of each firm.
pub fn recent_grades(mut table: RowTable, now: DateTime<Utc>, months_back: u32) -> RowTable {
    let cutoff = now
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    table.retain(|row| row.index.as_time().is_some_and(|t| t >= cutoff));
    table.sort_by(|a, b| b.index.as_time().cmp(&a.index.as_time()));

    let firm = table.column_position("Firm");
    let mut seen = HashSet::new();
    table.retain(|row| {
        match firm.and_then(|i| row.cells.get(i)).and_then(Cell::as_text) {
            Some(name) => seen.insert(name.to_string()),
            None => true,
        }
    });
    table
}

#[derive(Debug, Clone)]
pub struct RecommendationsTool;

impl RecommendationsTool {
    pub const NAME: &'static str = "get_recommendations";

    pub const DESCRIPTION: &'static str = "Get recommendations or upgrades/downgrades for a given ticker symbol from yahoo finance. You can also specify the number of months back to get upgrades/downgrades for, default is 12.";

    #[instrument(skip_all, fields(ticker = %params.ticker, recommendation_type = %params.recommendation_type))]
    pub async fn execute(
        params: &RecommendationsParams,
        provider: &dyn MarketDataProvider,
    ) -> CallToolResult {
        into_result(Self::run(params, provider, Utc::now()).await)
    }

    async fn run(
        params: &RecommendationsParams,
        provider: &dyn MarketDataProvider,
        now: DateTime<Utc>,
    ) -> Result<String, ToolError> {
        let kind: RecommendationType = params.recommendation_type.parse()?;
        let instrument = resolve(provider, &params.ticker, ACTION).await?;

        let mut table = provider
            .recommendations(&instrument.symbol, kind)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        if kind == RecommendationType::UpgradesDowngrades {
            let total = table.len();
            table = recent_grades(table, now, params.months_back);
            debug!("Kept {} of {} grade changes", table.len(), total);
        }

        to_json_text(&table.to_records())
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<RecommendationsParams>(),
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
                let params: RecommendationsParams =
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
    use crate::domains::tools::definitions::common::test_support::{is_error, text_of};
    use chrono::TimeZone;
    use serde_json::Value;

    fn params(ticker: &str) -> RecommendationsParams {
        serde_json::from_value(serde_json::json!({ "ticker": ticker })).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn grades() -> RowTable {
        let mut table = RowTable::with_index("GradeDate", ["Firm", "ToGrade", "FromGrade", "Action"]);
        let mut push = |date: DateTime<Utc>, firm: &str, to: &str| {
            table.push_row(date, vec![firm.into(), to.into(), "Hold".into(), "up".into()]);
        };
        push(at(2024, 3, 1), "Barclays", "Underweight");
        push(at(2024, 9, 1), "Barclays", "Equal-Weight");
        push(at(2024, 6, 15), "Morgan Stanley", "Overweight");
        push(at(2022, 1, 10), "Jefferies", "Buy");
        table
    }

    #[test]
    fn test_recent_grades_window_order_and_dedup() {
        let table = recent_grades(grades(), at(2024, 10, 1), 12);
        let records = table.to_records();

        let firms: Vec<_> = records.iter().map(|r| r["Firm"].as_str().unwrap()).collect();
        assert_eq!(firms, vec!["Barclays", "Morgan Stanley"]);
        assert_eq!(records[0]["ToGrade"], "Equal-Weight");
        assert_eq!(records[0]["GradeDate"], "2024-09-01T00:00:00.000Z");
    }

    #[test]
    fn test_recent_grades_zero_months_is_empty() {
        assert!(recent_grades(grades(), at(2024, 10, 1), 0).is_empty());
    }

    #[test]
    fn test_params_defaults() {
        let params = params("AAPL");
        assert_eq!(params.recommendation_type, "recommendations");
        assert_eq!(params.months_back, 12);
    }

    #[tokio::test]
    async fn test_trend_rows_pass_through() {
        let mut trend = RowTable::new(["period", "strongBuy", "buy", "hold", "sell", "strongSell"]);
        trend.push_row(
            Cell::Missing,
            vec!["0m".into(), 7_i64.into(), 21_i64.into(), 14_i64.into(), 1_i64.into(), 2_i64.into()],
        );
        let mut provider = FixtureProvider::knowing("AAPL");
        provider
            .recommendations
            .insert(RecommendationType::Recommendations, trend);

        let result = RecommendationsTool::execute(&params("AAPL"), &provider).await;
        assert!(!is_error(&result));
        assert_eq!(
            text_of(&result),
            r#"[{"period":"0m","strongBuy":7,"buy":21,"hold":14,"sell":1,"strongSell":2}]"#
        );
    }

    #[tokio::test]
    async fn test_upgrades_downgrades_are_filtered() {
        let mut provider = FixtureProvider::knowing("AAPL");
        provider
            .recommendations
            .insert(RecommendationType::UpgradesDowngrades, grades());
        let params = RecommendationsParams {
            recommendation_type: "upgrades_downgrades".into(),
            months_back: 12,
            ..params("AAPL")
        };

        let text = RecommendationsTool::run(&params, &provider, at(2024, 10, 1))
            .await
            .unwrap();
        let records: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(provider.calls()[1], "recommendations:upgrades_downgrades");
    }

    #[tokio::test]
    async fn test_invalid_recommendation_type() {
        let provider = FixtureProvider::knowing("AAPL");
        let params = RecommendationsParams {
            recommendation_type: "targets".into(),
            ..params("AAPL")
        };
        let result = RecommendationsTool::execute(&params, &provider).await;
        assert!(is_error(&result));
        assert_eq!(
            text_of(&result),
            "Error: invalid recommendation type targets. Please use one of the following: \
             recommendations, upgrades_downgrades."
        );
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = FixtureProvider::knowing("AAPL");
        let result = RecommendationsTool::execute(&params("INVALIDTICKERXYZ"), &provider).await;
        assert_eq!(text_of(&result), "Company ticker INVALIDTICKERXYZ not found.");
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = FixtureProvider {
            fail_fetch: true,
            ..FixtureProvider::knowing("AAPL")
        };
        let result = RecommendationsTool::execute(&params("AAPL"), &provider).await;
        assert!(text_of(&result).starts_with("Error: getting recommendations for AAPL: "));
    }
}
