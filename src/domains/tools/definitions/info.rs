//! Stock information tool: the provider's info bag projected onto a fixed allow-list.

use std::sync::Arc;

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
use crate::domains::finance::{MarketDataProvider, project_info};
use crate::domains::tools::ToolError;

const ACTION: &str = "getting stock information";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockInfoParams {
    #[schemars(description = "The ticker symbol of the stock to get information for, e.g. \"AAPL\"")]
    pub ticker: String,
}

#[derive(Debug, Clone)]
pub struct StockInfoTool;

impl StockInfoTool {
    pub const NAME: &'static str = "get_stock_info";

    pub const DESCRIPTION: &'static str = "Get stock information for a given ticker symbol from yahoo finance. Include the following information: Company Basics, Valuation Metrics, Growth, Margins, Financial Health, Dividend, and Basic Technical Metrics.";

    #[instrument(skip_all, fields(ticker = %params.ticker))]
    pub async fn execute(params: &StockInfoParams, provider: &dyn MarketDataProvider) -> CallToolResult {
        into_result(Self::run(params, provider).await)
    }

    async fn run(params: &StockInfoParams, provider: &dyn MarketDataProvider) -> Result<String, ToolError> {
        let instrument = resolve(provider, &params.ticker, ACTION).await?;

        let bag = provider
            .info(&instrument.symbol)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        let projected = project_info(&bag);
        debug!("Kept {} of {} info fields", projected.len(), bag.len());
        to_json_text(&projected)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<StockInfoParams>(),
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
                let params: StockInfoParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, provider.as_ref()).await)
            }
            .boxed()
        })
    }
}
