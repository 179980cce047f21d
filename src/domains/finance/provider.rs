//! The upstream market-data contract.
//!
//! Tools only talk to [`MarketDataProvider`]; the Yahoo Finance client in
//! [`super::yahoo`] is the production implementation.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ProviderResult;
use super::kinds::{FinancialType, HolderType, Interval, Period, RecommendationType};
use super::projection::InfoBag;
use super::table::{RowTable, TimeSeriesTable};

/// Handle to an instrument the provider knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    /// Symbol as canonicalized by the provider.
    pub symbol: String,
    pub exchange: Option<String>,
    pub instrument_type: Option<String>,
    pub currency: Option<String>,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: None,
            instrument_type: None,
            currency: None,
        }
    }
}

/// `AAPL (NMS, EQUITY, USD)`; only the known details are listed.
impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)?;
        let details: Vec<&str> = [&self.exchange, &self.instrument_type, &self.currency]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .collect();
        if !details.is_empty() {
            write!(f, " ({})", details.join(", "))?;
        }
        Ok(())
    }
}

/// Request/response contract of the upstream financial-data source.
///
/// Every method is an independent network round trip; implementations must
/// not cache market data between calls.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Resolve a ticker. `Ok(None)` means the provider does not know the symbol.
    async fn lookup(&self, ticker: &str) -> ProviderResult<Option<Instrument>>;

    /// OHLCV bars indexed by `Date`, plus `Dividends` and `Stock Splits`.
    async fn history(&self, ticker: &str, period: Period, interval: Interval)
    -> ProviderResult<RowTable>;

    /// Raw company/instrument info bag.
    async fn info(&self, ticker: &str) -> ProviderResult<InfoBag>;

    /// Raw news items, in provider order.
    async fn news(&self, ticker: &str) -> ProviderResult<Vec<Value>>;

    /// Dividends and splits over the full history, indexed by `Date`.
    async fn actions(&self, ticker: &str) -> ProviderResult<RowTable>;

    /// Statement metrics (rows) by reporting date (columns).
    async fn financial_statement(
        &self,
        ticker: &str,
        kind: FinancialType,
    ) -> ProviderResult<TimeSeriesTable>;

    /// Ownership disclosures of one kind.
    async fn holders(&self, ticker: &str, kind: HolderType) -> ProviderResult<RowTable>;

    /// Analyst recommendation trend or grade history.
    async fn recommendations(
        &self,
        ticker: &str,
        kind: RecommendationType,
    ) -> ProviderResult<RowTable>;
}
