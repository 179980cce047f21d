//! Allow-list projection of the company info bag.

use serde_json::{Map, Value};

/// Heterogeneous key-value description of a company, as returned upstream.
pub type InfoBag = Map<String, Value>;

/// Fields surfaced by `get_stock_info`. Grouping is documentation only.
pub const INFO_FIELDS: &[&str] = &[
    // Company basics
    "symbol",
    "longName",
    "shortName",
    "sector",
    "industry",
    "website",
    "currency",
    // Valuation
    "marketCap",
    "trailingPE",
    "forwardPE",
    "priceToBook",
    "trailingEps",
    "forwardEps",
    "bookValue",
    // Growth
    "earningsGrowth",
    "revenueGrowth",
    "netIncomeToCommon",
    // Margins
    "profitMargins",
    "grossMargins",
    "operatingMargins",
    "returnOnAssets",
    "returnOnEquity",
    // Financial health
    "totalRevenue",
    "totalCash",
    "totalDebt",
    "debtToEquity",
    "currentRatio",
    "quickRatio",
    // Dividend
    "dividendRate",
    "dividendYield",
    "payoutRatio",
    "trailingAnnualDividendRate",
    "trailingAnnualDividendYield",
    // Technical
    "currentPrice",
    "fiftyDayAverage",
    "twoHundredDayAverage",
    "fiftyTwoWeekLow",
    "fiftyTwoWeekHigh",
    "regularMarketChangePercent",
    "fiftyTwoWeekChangePercent",
    "volume",
    "averageVolume",
    "averageDailyVolume3Month",
    "beta",
];

/// Whether a provider field is allowed through to callers.
pub fn is_info_field(key: &str) -> bool {
    INFO_FIELDS.contains(&key)
}

/// Keep only allow-listed keys, in the bag's own order, values untouched.
pub fn project_info(bag: &InfoBag) -> InfoBag {
    bag.iter()
        .filter(|(key, _)| is_info_field(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
