//! `v10/finance/quoteSummary` and `v7/finance/quote` payloads.
//!
//! quoteSummary values come either as plain scalars (`formatted=false`) or as
//! `{ "raw": .., "fmt": .. }` wrappers; both are accepted.

use chrono::{TimeZone, Utc};
use serde_json::{Map, Value};

use crate::domains::finance::error::{ProviderError, ProviderResult};
use crate::domains::finance::kinds::{HolderType, RecommendationType};
use crate::domains::finance::projection::InfoBag;
use crate::domains::finance::table::{Cell, RowTable};

/// Modules merged into the info bag, in merge order.
pub const INFO_MODULES: [&str; 6] = [
    "assetProfile",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "price",
    "quoteType",
];

/// quoteSummary module carrying a holder kind.
pub fn holder_module(kind: HolderType) -> &'static str {
    match kind {
        HolderType::MajorHolders => "majorHoldersBreakdown",
        HolderType::InstitutionalHolders => "institutionOwnership",
        HolderType::MutualfundHolders => "fundOwnership",
        HolderType::InsiderTransactions => "insiderTransactions",
        HolderType::InsiderPurchases => "netSharePurchaseActivity",
        HolderType::InsiderRosterHolders => "insiderHolders",
    }
}

/// quoteSummary module carrying a recommendation kind.
pub fn recommendation_module(kind: RecommendationType) -> &'static str {
    match kind {
        RecommendationType::Recommendations => "recommendationTrend",
        RecommendationType::UpgradesDowngrades => "upgradeDowngradeHistory",
    }
}

/// Extract the first result object of a quoteSummary response.
pub fn parse_summary(body: &Value) -> ProviderResult<Map<String, Value>> {
    let root = body
        .get("quoteSummary")
        .ok_or_else(|| ProviderError::parse("missing quoteSummary"))?;

    if let Some(err) = root.get("error").filter(|e| !e.is_null()) {
        return Err(upstream_error(err));
    }

    root.pointer("/result/0")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| ProviderError::parse("quoteSummary has no result"))
}

/// Extract the first record of a `v7/finance/quote` response, if any.
pub fn parse_quote(body: &Value) -> ProviderResult<Option<Map<String, Value>>> {
    let root = body
        .get("quoteResponse")
        .ok_or_else(|| ProviderError::parse("missing quoteResponse"))?;

    if let Some(err) = root.get("error").filter(|e| !e.is_null()) {
        return Err(upstream_error(err));
    }

    Ok(root
        .pointer("/result/0")
        .and_then(Value::as_object)
        .cloned())
}

fn upstream_error(err: &Value) -> ProviderError {
    let field = |name: &str| err.get(name).and_then(Value::as_str).unwrap_or_default();
    ProviderError::upstream(field("code"), field("description"))
}

/// Unwrap `{raw, fmt}` wrappers. Empty objects (Yahoo's "no value") yield `None`.
fn unwrap_raw(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(obj) if obj.is_empty() => None,
        Value::Object(obj) => obj.get("raw").or(Some(value)),
        other => Some(other),
    }
}

/// Merge the info modules and the quote record into one flat bag.
/// The first source to provide a key wins.
pub fn info_bag(summary: &Map<String, Value>, quote: Option<&Map<String, Value>>) -> InfoBag {
    let mut bag = InfoBag::new();
    let modules = INFO_MODULES
        .iter()
        .filter_map(|name| summary.get(*name).and_then(Value::as_object));

    for source in modules.chain(quote) {
        for (key, value) in source {
            if bag.contains_key(key) {
                continue;
            }
            if let Some(value) = unwrap_raw(value) {
                bag.insert(key.clone(), value.clone());
            }
        }
    }
    bag
}

fn number(item: &Value, key: &str) -> Cell {
    match item.get(key).and_then(unwrap_raw) {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Cell::Int)
            .or_else(|| n.as_f64().map(Cell::Float))
            .unwrap_or(Cell::Missing),
        _ => Cell::Missing,
    }
}

fn text(item: &Value, key: &str) -> Cell {
    match item.get(key).and_then(unwrap_raw) {
        Some(Value::String(s)) => Cell::Text(s.clone()),
        _ => Cell::Missing,
    }
}

fn epoch(item: &Value, key: &str) -> Cell {
    item.get(key)
        .and_then(unwrap_raw)
        .and_then(Value::as_i64)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(Cell::Time)
        .unwrap_or(Cell::Missing)
}

fn list<'a>(module: Option<&'a Value>, key: &str) -> &'a [Value] {
    module
        .and_then(|m| m.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Build the table for a holder kind from a quoteSummary result.
pub fn holders_table(kind: HolderType, summary: &Map<String, Value>) -> RowTable {
    let module = summary.get(holder_module(kind));
    match kind {
        HolderType::MajorHolders => major_holders(module),
        HolderType::InstitutionalHolders | HolderType::MutualfundHolders => {
            ownership(list(module, "ownershipList"))
        }
        HolderType::InsiderTransactions => insider_transactions(list(module, "transactions")),
        HolderType::InsiderPurchases => insider_purchases(module),
        HolderType::InsiderRosterHolders => insider_roster(list(module, "holders")),
    }
}

fn major_holders(module: Option<&Value>) -> RowTable {
    const METRICS: [&str; 4] = [
        "insidersPercentHeld",
        "institutionsPercentHeld",
        "institutionsFloatPercentHeld",
        "institutionsCount",
    ];

    let mut table = RowTable::with_index("metric", ["Value"]);
    if let Some(module) = module {
        for metric in METRICS {
            let value = number(module, metric);
            if !value.is_missing() {
                table.push_row(metric, vec![value]);
            }
        }
    }
    table
}

fn ownership(items: &[Value]) -> RowTable {
    let mut table = RowTable::new([
        "Date Reported",
        "Holder",
        "pctHeld",
        "Shares",
        "Value",
        "pctChange",
    ]);
    for item in items {
        table.push_row(
            Cell::Missing,
            vec![
                epoch(item, "reportDate"),
                text(item, "organization"),
                number(item, "pctHeld"),
                number(item, "position"),
                number(item, "value"),
                number(item, "pctChange"),
            ],
        );
    }
    table
}

fn insider_transactions(items: &[Value]) -> RowTable {
    let mut table = RowTable::new([
        "Shares",
        "Value",
        "URL",
        "Text",
        "Insider",
        "Position",
        "Transaction",
        "Start Date",
        "Ownership",
    ]);
    for item in items {
        table.push_row(
            Cell::Missing,
            vec![
                number(item, "shares"),
                number(item, "value"),
                text(item, "filerUrl"),
                text(item, "transactionText"),
                text(item, "filerName"),
                text(item, "filerRelation"),
                text(item, "moneyText"),
                epoch(item, "startDate"),
                text(item, "ownership"),
            ],
        );
    }
    table
}

fn insider_purchases(module: Option<&Value>) -> RowTable {
    let Some(module) = module else {
        return RowTable::default();
    };

    let period = module
        .get("period")
        .and_then(Value::as_str)
        .unwrap_or("6m");
    let mut table = RowTable::new([
        format!("Insider Purchases Last {period}"),
        "Shares".to_string(),
        "Trans".to_string(),
    ]);

    let rows: [(&str, &str, Option<&str>); 7] = [
        ("Purchases", "buyInfoShares", Some("buyInfoCount")),
        ("Sales", "sellInfoShares", Some("sellInfoCount")),
        ("Net Shares Purchased (Sold)", "netInfoShares", Some("netInfoCount")),
        ("Total Insider Shares Held", "totalInsiderShares", None),
        ("% Net Shares Purchased (Sold)", "netPercentInsiderShares", None),
        ("% Buy Shares", "buyPercentInsiderShares", None),
        ("% Sell Shares", "sellPercentInsiderShares", None),
    ];
    for (label, shares, trans) in rows {
        let trans = trans.map(|key| number(module, key)).unwrap_or(Cell::Missing);
        table.push_row(Cell::Missing, vec![Cell::from(label), number(module, shares), trans]);
    }
    table
}

fn insider_roster(items: &[Value]) -> RowTable {
    let mut table = RowTable::new([
        "Name",
        "Position",
        "URL",
        "Most Recent Transaction",
        "Latest Transaction Date",
        "Shares Owned Directly",
        "Position Direct Date",
    ]);
    for item in items {
        table.push_row(
            Cell::Missing,
            vec![
                text(item, "name"),
                text(item, "relation"),
                text(item, "url"),
                text(item, "transactionDescription"),
                epoch(item, "latestTransDate"),
                number(item, "positionDirect"),
                epoch(item, "positionDirectDate"),
            ],
        );
    }
    table
}

/// Build the table for a recommendation kind from a quoteSummary result.
pub fn recommendations_table(kind: RecommendationType, summary: &Map<String, Value>) -> RowTable {
    let module = summary.get(recommendation_module(kind));
    match kind {
        RecommendationType::Recommendations => {
            const COLUMNS: [&str; 6] = ["period", "strongBuy", "buy", "hold", "sell", "strongSell"];
            let mut table = RowTable::new(COLUMNS);
            for item in list(module, "trend") {
                let mut cells = vec![text(item, "period")];
                cells.extend(COLUMNS[1..].iter().map(|key| number(item, key)));
                table.push_row(Cell::Missing, cells);
            }
            table
        }
        RecommendationType::UpgradesDowngrades => {
            let mut table =
                RowTable::with_index("GradeDate", ["Firm", "ToGrade", "FromGrade", "Action"]);
            for item in list(module, "history") {
                table.push_row(
                    epoch(item, "epochGradeDate"),
                    vec![
                        text(item, "firm"),
                        text(item, "toGrade"),
                        text(item, "fromGrade"),
                        text(item, "action"),
                    ],
                );
            }
            table
        }
    }
}
