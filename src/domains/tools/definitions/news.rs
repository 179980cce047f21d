//! News tool. Unlike every other tool the output is plain text, not JSON.

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

use super::common::{into_result, resolve};
use crate::domains::finance::MarketDataProvider;
use crate::domains::finance::news::render_news;
use crate::domains::tools::ToolError;

const ACTION: &str = "getting news";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewsParams {
    #[schemars(description = "The ticker symbol of the stock to get news for, e.g. \"AAPL\"")]
    pub ticker: String,
}

#[derive(Debug, Clone)]
pub struct NewsTool;

impl NewsTool {
    pub const NAME: &'static str = "get_yahoo_finance_news";

    pub const DESCRIPTION: &'static str =
        "Get news for a given ticker symbol from yahoo finance. Returns one Title/Summary/Description/URL block per story.";

    #[instrument(skip_all, fields(ticker = %params.ticker))]
    pub async fn execute(params: &NewsParams, provider: &dyn MarketDataProvider) -> CallToolResult {
        into_result(Self::run(params, provider).await)
    }

    async fn run(params: &NewsParams, provider: &dyn MarketDataProvider) -> Result<String, ToolError> {
        let instrument = resolve(provider, &params.ticker, ACTION).await?;

        let items = provider
            .news(&instrument.symbol)
            .await
            .map_err(|e| ToolError::provider(ACTION, &params.ticker, e))?;

        // The sentinel names the ticker as the caller typed it.
        Ok(render_news(&params.ticker, &items))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<NewsParams>(),
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
                let params: NewsParams = serde_json::from_value(serde_json::Value::Object(args))
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
    use serde_json::json;

    fn params(ticker: &str) -> NewsParams {
        NewsParams {
            ticker: ticker.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stories_rendered() {
        let provider = FixtureProvider {
            news: vec![
                json!({ "content": { "contentType": "STORY", "title": "Earnings beat",
                    "summary": "s", "description": "d",
                    "canonicalUrl": { "url": "https://finance.yahoo.com/news/a" } } }),
                json!({ "content": { "contentType": "VIDEO", "title": "Clip" } }),
            ],
            ..FixtureProvider::knowing("AAPL")
        };
        let result = NewsTool::execute(&params("AAPL"), &provider).await;
        assert!(!is_error(&result));
        assert_eq!(
            text_of(&result),
            "Title: Earnings beat\nSummary: s\nDescription: d\nURL: https://finance.yahoo.com/news/a"
        );
    }

    #[tokio::test]
    async fn test_no_stories_returns_sentinel_as_success() {
        let provider = FixtureProvider::knowing("MSFT");
        let result = NewsTool::execute(&params("MSFT"), &provider).await;
        assert!(!is_error(&result));
        assert_eq!(
            text_of(&result),
            "No news found for company that searched with MSFT ticker."
        );
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = FixtureProvider::knowing("AAPL");
        let result = NewsTool::execute(&params("INVALIDTICKERXYZ"), &provider).await;
        assert!(is_error(&result));
        assert_eq!(text_of(&result), "Company ticker INVALIDTICKERXYZ not found.");
        assert_eq!(provider.calls(), vec!["lookup"]);
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = FixtureProvider {
            fail_fetch: true,
            ..FixtureProvider::knowing("AAPL")
        };
        let result = NewsTool::execute(&params("AAPL"), &provider).await;
        assert!(text_of(&result).starts_with("Error: getting news for AAPL: "));
    }
}
