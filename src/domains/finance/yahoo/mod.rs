//! Yahoo Finance implementation of [`MarketDataProvider`].
//!
//! Endpoints used:
//! - `v8/finance/chart` for lookup, history and corporate actions
//! - `v10/finance/quoteSummary` and `v7/finance/quote` for info, holders and
//!   recommendations (crumb-authenticated)
//! - `ws/fundamentals-timeseries` for financial statements
//! - `xhr/ncp` for the latest news stream

pub mod auth;
pub mod chart;
pub mod summary;
pub mod timeseries;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use self::auth::CrumbStore;
use self::chart::{ChartResult, is_unknown_symbol, parse_chart};
use super::error::{ProviderError, ProviderResult};
use super::kinds::{FinancialType, HolderType, Interval, Period, RecommendationType};
use super::projection::InfoBag;
use super::provider::{Instrument, MarketDataProvider};
use super::table::{RowTable, TimeSeriesTable};
use crate::core::config::ProviderConfig;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const NEWS_URL: &str = "https://finance.yahoo.com/xhr/ncp";

/// `{base}/{ticker}` with the ticker as a single percent-encoded path segment,
/// so `?`, `#` and `/` in caller input cannot reshape the request.
fn symbol_url(base: &str, ticker: &str) -> String {
    format!("{base}/{}", urlencoding::encode(ticker))
}

/// Yahoo Finance client. Holds the HTTP client, its cookie jar and the crumb;
/// market data is never cached.
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    crumb: CrumbStore,
    news_count: u32,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            crumb: CrumbStore::new(),
            news_count: config.news_count,
        })
    }

    /// Send a request and decode a JSON body, mapping throttling and error statuses.
    async fn send_json(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> ProviderResult<Value> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited(endpoint.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::status(status.as_u16(), endpoint));
        }

        Ok(response.json::<Value>().await?)
    }

    /// GET with the session crumb appended, refreshing the session once on 401/403.
    async fn get_with_crumb(
        &self,
        endpoint: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> ProviderResult<Value> {
        let mut refreshed = false;
        loop {
            let crumb = self.crumb.get(&self.client).await?;
            let request = self
                .client
                .get(url)
                .query(query)
                .query(&[("crumb", crumb.as_str())]);

            match self.send_json(endpoint, request).await {
                Err(e) if e.is_unauthorized() && !refreshed => {
                    debug!("{} rejected the crumb, refreshing session", endpoint);
                    self.crumb.invalidate().await;
                    refreshed = true;
                }
                other => return other,
            }
        }
    }

    async fn chart(&self, ticker: &str, range: &str, interval: &str) -> ProviderResult<ChartResult> {
        let url = symbol_url(CHART_URL, ticker);
        debug!("Fetching chart: {} range={} interval={}", url, range, interval);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", range),
                ("interval", interval),
                ("events", "div,splits"),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited("chart".into()));
        }
        let body = response.text().await?;
        parse_chart(status.as_u16(), &body)
    }

    async fn quote_summary(&self, ticker: &str, modules: &[&str]) -> ProviderResult<Map<String, Value>> {
        let url = symbol_url(QUOTE_SUMMARY_URL, ticker);
        let modules = modules.join(",");
        debug!("Fetching quoteSummary: {} modules={}", url, modules);

        let body = self
            .get_with_crumb(
                "quoteSummary",
                &url,
                &[
                    ("modules", modules.as_str()),
                    ("formatted", "false"),
                    ("corsDomain", "finance.yahoo.com"),
                ],
            )
            .await?;
        summary::parse_summary(&body)
    }

    async fn quote(&self, ticker: &str) -> ProviderResult<Option<Map<String, Value>>> {
        let body = self
            .get_with_crumb("quote", QUOTE_URL, &[("symbols", ticker)])
            .await?;
        summary::parse_quote(&body)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn lookup(&self, ticker: &str) -> ProviderResult<Option<Instrument>> {
        match self.chart(ticker, "1d", "1d").await {
            Ok(chart) => Ok(Some(chart.instrument())),
            Err(e) if is_unknown_symbol(&e) => {
                debug!("Yahoo does not know {}: {}", ticker, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> ProviderResult<RowTable> {
        let chart = self.chart(ticker, period.as_str(), interval.as_str()).await?;
        Ok(chart.history_table())
    }

    async fn info(&self, ticker: &str) -> ProviderResult<InfoBag> {
        let summary = self.quote_summary(ticker, &summary::INFO_MODULES).await?;

        // The v7 quote only adds market fields; info is still usable without it.
        let quote = match self.quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("v7 quote for {} failed, continuing without it: {}", ticker, e);
                None
            }
        };

        Ok(summary::info_bag(&summary, quote.as_ref()))
    }

    async fn news(&self, ticker: &str) -> ProviderResult<Vec<Value>> {
        let body = json!({
            "serviceConfig": {
                "snippetCount": self.news_count,
                "s": [ticker],
            }
        });
        let request = self
            .client
            .post(NEWS_URL)
            .query(&[("queryRef", "latestNews"), ("serviceKey", "ncp_fin")])
            .json(&body);

        let response = self.send_json("news", request).await?;
        Ok(response
            .pointer("/data/tickerStream/stream")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn actions(&self, ticker: &str) -> ProviderResult<RowTable> {
        // Events cover the whole range whatever the bar size, so coarse bars keep the payload small.
        let chart = self.chart(ticker, "max", "1mo").await?;
        Ok(chart.actions_table())
    }

    async fn financial_statement(
        &self,
        ticker: &str,
        kind: FinancialType,
    ) -> ProviderResult<TimeSeriesTable> {
        let url = symbol_url(TIMESERIES_URL, ticker);
        let types = timeseries::type_param(kind);
        let period1 = timeseries::PERIOD_START.to_string();
        let period2 = Utc::now().timestamp().to_string();
        debug!("Fetching {} for {}", kind, ticker);

        let request = self.client.get(&url).query(&[
            ("symbol", ticker),
            ("type", types.as_str()),
            ("period1", period1.as_str()),
            ("period2", period2.as_str()),
        ]);
        let body = self.send_json("fundamentals-timeseries", request).await?;
        timeseries::parse_timeseries(kind, &body)
    }

    async fn holders(&self, ticker: &str, kind: HolderType) -> ProviderResult<RowTable> {
        let summary = self
            .quote_summary(ticker, &[summary::holder_module(kind)])
            .await?;
        Ok(summary::holders_table(kind, &summary))
    }

    async fn recommendations(
        &self,
        ticker: &str,
        kind: RecommendationType,
    ) -> ProviderResult<RowTable> {
        let summary = self
            .quote_summary(ticker, &[summary::recommendation_module(kind)])
            .await?;
        Ok(summary::recommendations_table(kind, &summary))
    }
}
