//! Holder information tool. Defaults to the major holders breakdown.

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
use crate::domains::finance::{HolderType, MarketDataProvider};
use crate::domains::tools::ToolError;

const ACTION: &str = "getting holder info";

fn default_holder_type() -> String {
    HolderType::MajorHolders.as_str().to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HolderInfoParams {
    #[schemars(description = "The ticker symbol of the stock to get holder information for, e.g. \"AAPL\"")]
    pub ticker: String,

    #[schemars(
        description = "One of: major_holders, institutional_holders, mutualfund_holders, insider_transactions, insider_purchases, insider_roster_holders. Default is \"major_holders\""
    )]
    #[serde(default = "default_holder_type")]
    pub holder_type: String,
}

#[derive(Debug, Clone)]
pub struct HolderInfoTool;

impl HolderInfoTool {
    pub const NAME: &'static str = "get_holder_info";

    pub const DESCRIPTION: &'static str = "Get holder information for a given ticker symbol from yahoo finance. You can choose from the following holder types: major_holders, institutional_holders, mutualfund_holders, insider_transactions, insider_purchases, insider_roster_holders.";

    #[instrument(skip_all, fields(ticker = %params.ticker, holder_type = %params.holder_type))]
    pub async fn execute(params: &HolderInfoParams, provider: &dyn MarketDataProvider) -> CallToolResult {
        into_result(Self::run(params, provider).await)
    }

    async fn run(params: &HolderInfoParams, provider: &dyn MarketDataProvider) -> Result<String, ToolError> {
        let kind: HolderType = params.holder_type.parse()?;
        let instrument = resolve(provider, &params.ticker, ACTION).await?;

        let table = provider
            .holders(&instrument.symbol, kind)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        to_json_text(&table.to_records())
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<HolderInfoParams>(),
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
                let params: HolderInfoParams =
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

    fn params(ticker: &str) -> HolderInfoParams {
        serde_json::from_value(serde_json::json!({ "ticker": ticker })).unwrap()
    }

    fn provider() -> FixtureProvider {
        let mut major = RowTable::with_index("metric", ["Value"]);
        major.push_row("insidersPercentHeld", vec![Cell::Float(0.0207)]);
        major.push_row("institutionsCount", vec![Cell::Int(6835)]);

        let mut provider = FixtureProvider::knowing("AAPL");
        provider.holders.insert(HolderType::MajorHolders, major);
        provider
    }

    #[tokio::test]
    async fn test_major_holders_by_default() {
        let provider = provider();
        let result = HolderInfoTool::execute(&params("AAPL"), &provider).await;
        assert!(!is_error(&result));
        assert_eq!(
            text_of(&result),
            r#"[{"metric":"insidersPercentHeld","Value":0.0207},{"metric":"institutionsCount","Value":6835}]"#
        );
        assert_eq!(provider.calls(), vec!["lookup", "holders:major_holders"]);
    }

    #[tokio::test]
    async fn test_other_holder_type() {
        let provider = provider();
        let params = HolderInfoParams {
            holder_type: "insider_roster_holders".into(),
            ..params("AAPL")
        };
        let result = HolderInfoTool::execute(&params, &provider).await;
        assert_eq!(text_of(&result), "[]");
        assert_eq!(provider.calls()[1], "holders:insider_roster_holders");
    }

    #[tokio::test]
    async fn test_invalid_holder_type() {
        let provider = provider();
        let params = HolderInfoParams {
            holder_type: "whales".into(),
            ..params("AAPL")
        };
        let result = HolderInfoTool::execute(&params, &provider).await;
        assert!(is_error(&result));
        assert_eq!(
            text_of(&result),
            "Error: invalid holder type whales. Please use one of the following: major_holders, \
             institutional_holders, mutualfund_holders, insider_transactions, insider_purchases, \
             insider_roster_holders."
        );
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = provider();
        let result = HolderInfoTool::execute(&params("INVALIDTICKERXYZ"), &provider).await;
        assert_eq!(text_of(&result), "Company ticker INVALIDTICKERXYZ not found.");
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = FixtureProvider {
            fail_fetch: true,
            ..FixtureProvider::knowing("AAPL")
        };
        let result = HolderInfoTool::execute(&params("AAPL"), &provider).await;
        assert!(text_of(&result).starts_with("Error: getting holder info for AAPL: "));
    }
}
