//! `ws/fundamentals-timeseries` payloads: financial statements.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde_json::Value;

use crate::domains::finance::error::{ProviderError, ProviderResult};
use crate::domains::finance::kinds::FinancialType;
use crate::domains::finance::table::{Cell, ColumnKey, TimeSeriesTable};

/// Start of the requested window (2016-12-31). Yahoo serves at most ~5 years anyway.
pub const PERIOD_START: i64 = 1_483_142_400;

const INCOME_KEYS: &[&str] = &[
    "TaxEffectOfUnusualItems",
    "TaxRateForCalcs",
    "NormalizedEBITDA",
    "NormalizedDilutedEPS",
    "NormalizedBasicEPS",
    "TotalUnusualItems",
    "TotalUnusualItemsExcludingGoodwill",
    "NetIncomeFromContinuingOperationNetMinorityInterest",
    "ReconciledDepreciation",
    "ReconciledCostOfRevenue",
    "EBITDA",
    "EBIT",
    "NetInterestIncome",
    "InterestExpense",
    "InterestIncome",
    "NormalizedIncome",
    "NetIncomeFromContinuingAndDiscontinuedOperation",
    "TotalExpenses",
    "TotalOperatingIncomeAsReported",
    "DilutedAverageShares",
    "BasicAverageShares",
    "DilutedEPS",
    "BasicEPS",
    "DilutedNIAvailtoComStockholders",
    "NetIncomeCommonStockholders",
    "NetIncome",
    "NetIncomeIncludingNoncontrollingInterests",
    "NetIncomeContinuousOperations",
    "TaxProvision",
    "PretaxIncome",
    "OtherIncomeExpense",
    "OtherNonOperatingIncomeExpenses",
    "SpecialIncomeCharges",
    "NetNonOperatingInterestIncomeExpense",
    "InterestExpenseNonOperating",
    "InterestIncomeNonOperating",
    "OperatingIncome",
    "OperatingExpense",
    "ResearchAndDevelopment",
    "SellingGeneralAndAdministration",
    "GrossProfit",
    "CostOfRevenue",
    "TotalRevenue",
    "OperatingRevenue",
];

const BALANCE_SHEET_KEYS: &[&str] = &[
    "TreasurySharesNumber",
    "OrdinarySharesNumber",
    "ShareIssued",
    "NetDebt",
    "TotalDebt",
    "TangibleBookValue",
    "InvestedCapital",
    "WorkingCapital",
    "NetTangibleAssets",
    "CapitalLeaseObligations",
    "CommonStockEquity",
    "TotalCapitalization",
    "TotalEquityGrossMinorityInterest",
    "StockholdersEquity",
    "GainsLossesNotAffectingRetainedEarnings",
    "RetainedEarnings",
    "CapitalStock",
    "CommonStock",
    "TotalLiabilitiesNetMinorityInterest",
    "TotalNonCurrentLiabilitiesNetMinorityInterest",
    "OtherNonCurrentLiabilities",
    "TradeandOtherPayablesNonCurrent",
    "LongTermDebtAndCapitalLeaseObligation",
    "LongTermCapitalLeaseObligation",
    "LongTermDebt",
    "CurrentLiabilities",
    "OtherCurrentLiabilities",
    "CurrentDeferredLiabilities",
    "CurrentDeferredRevenue",
    "CurrentDebtAndCapitalLeaseObligation",
    "CurrentDebt",
    "OtherCurrentBorrowings",
    "CommercialPaper",
    "PayablesAndAccruedExpenses",
    "Payables",
    "AccountsPayable",
    "TotalAssets",
    "TotalNonCurrentAssets",
    "OtherNonCurrentAssets",
    "NonCurrentDeferredTaxesAssets",
    "InvestmentsAndAdvances",
    "OtherInvestments",
    "InvestmentinFinancialAssets",
    "NetPPE",
    "AccumulatedDepreciation",
    "GrossPPE",
    "Leases",
    "MachineryFurnitureEquipment",
    "LandAndImprovements",
    "Properties",
    "CurrentAssets",
    "OtherCurrentAssets",
    "Inventory",
    "Receivables",
    "OtherReceivables",
    "AccountsReceivable",
    "CashCashEquivalentsAndShortTermInvestments",
    "OtherShortTermInvestments",
    "CashAndCashEquivalents",
    "CashEquivalents",
    "CashFinancial",
];

const CASHFLOW_KEYS: &[&str] = &[
    "FreeCashFlow",
    "RepurchaseOfCapitalStock",
    "RepaymentOfDebt",
    "IssuanceOfDebt",
    "IssuanceOfCapitalStock",
    "CapitalExpenditure",
    "InterestPaidSupplementalData",
    "IncomeTaxPaidSupplementalData",
    "EndCashPosition",
    "BeginningCashPosition",
    "ChangesInCash",
    "FinancingCashFlow",
    "CashFlowFromContinuingFinancingActivities",
    "NetOtherFinancingCharges",
    "CashDividendsPaid",
    "CommonStockDividendPaid",
    "NetCommonStockIssuance",
    "CommonStockPayments",
    "CommonStockIssuance",
    "NetIssuancePaymentsOfDebt",
    "NetShortTermDebtIssuance",
    "NetLongTermDebtIssuance",
    "LongTermDebtPayments",
    "LongTermDebtIssuance",
    "InvestingCashFlow",
    "CashFlowFromContinuingInvestingActivities",
    "NetOtherInvestingChanges",
    "NetInvestmentPurchaseAndSale",
    "SaleOfInvestment",
    "PurchaseOfInvestment",
    "NetBusinessPurchaseAndSale",
    "PurchaseOfBusiness",
    "NetPPEPurchaseAndSale",
    "PurchaseOfPPE",
    "OperatingCashFlow",
    "CashFlowFromContinuingOperatingActivities",
    "ChangeInWorkingCapital",
    "ChangeInOtherWorkingCapital",
    "ChangeInOtherCurrentLiabilities",
    "ChangeInOtherCurrentAssets",
    "ChangeInPayablesAndAccruedExpense",
    "ChangeInPayable",
    "ChangeInAccountPayable",
    "ChangeInInventory",
    "ChangeInReceivables",
    "ChangesInAccountReceivables",
    "OtherNonCashItems",
    "StockBasedCompensation",
    "DeferredTax",
    "DeferredIncomeTax",
    "DepreciationAmortizationDepletion",
    "DepreciationAndAmortization",
    "NetIncomeFromContinuingOperations",
];

/// Metric keys requested for a statement kind, in output row order.
pub fn statement_keys(kind: FinancialType) -> &'static [&'static str] {
    match kind {
        FinancialType::IncomeStmt | FinancialType::QuarterlyIncomeStmt => INCOME_KEYS,
        FinancialType::BalanceSheet | FinancialType::QuarterlyBalanceSheet => BALANCE_SHEET_KEYS,
        FinancialType::Cashflow | FinancialType::QuarterlyCashflow => CASHFLOW_KEYS,
    }
}

fn frequency(kind: FinancialType) -> &'static str {
    if kind.is_quarterly() {
        "quarterly"
    } else {
        "annual"
    }
}

/// The comma-separated `type` query value, e.g. `annualTotalRevenue,annualEBIT`.
pub fn type_param(kind: FinancialType) -> String {
    let prefix = frequency(kind);
    statement_keys(kind)
        .iter()
        .map(|key| format!("{prefix}{key}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn reported_value(point: &Value) -> Cell {
    match point.pointer("/reportedValue/raw") {
        Some(Value::Number(n)) => n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing),
        _ => Cell::Missing,
    }
}

/// Build the statement table. Rows follow [`statement_keys`] order, columns are
/// reporting dates newest first. Metrics with no data points are omitted.
pub fn parse_timeseries(kind: FinancialType, body: &Value) -> ProviderResult<TimeSeriesTable> {
    let root = body
        .get("timeseries")
        .ok_or_else(|| ProviderError::parse("missing timeseries"))?;

    if let Some(err) = root.get("error").filter(|e| !e.is_null()) {
        let field = |name: &str| err.get(name).and_then(Value::as_str).unwrap_or_default();
        return Err(ProviderError::upstream(field("code"), field("description")));
    }

    let prefix = frequency(kind);
    let mut series: HashMap<&str, BTreeMap<NaiveDate, Cell>> = HashMap::new();
    let mut dates = BTreeSet::new();

    let results = root
        .get("result")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for result in results {
        let Some(full_type) = result.pointer("/meta/type/0").and_then(Value::as_str) else {
            continue;
        };
        let Some(metric) = full_type.strip_prefix(prefix) else {
            continue;
        };
        let Some(points) = result.get(full_type).and_then(Value::as_array) else {
            continue;
        };

        let values = series.entry(metric).or_default();
        for point in points.iter().filter(|p| !p.is_null()) {
            let Some(date) = point
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                continue;
            };
            dates.insert(date);
            values.insert(date, reported_value(point));
        }
    }

    let columns: Vec<NaiveDate> = dates.into_iter().rev().collect();
    let mut table = TimeSeriesTable::new(columns.iter().copied().map(ColumnKey::Date).collect());
    for key in statement_keys(kind) {
        let Some(values) = series.get(key).filter(|v| !v.is_empty()) else {
            continue;
        };
        let cells = columns
            .iter()
            .map(|date| values.get(date).cloned().unwrap_or(Cell::Missing))
            .collect();
        table.push_metric(*key, cells);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(date: &str, raw: f64) -> Value {
        json!({ "asOfDate": date, "periodType": "12M", "reportedValue": { "raw": raw, "fmt": "x" } })
    }

    #[test]
    fn test_type_param_prefixes_every_key() {
        let param = type_param(FinancialType::QuarterlyCashflow);
        assert!(param.starts_with("quarterlyFreeCashFlow,"));
        assert_eq!(param.split(',').count(), CASHFLOW_KEYS.len());
        assert!(type_param(FinancialType::IncomeStmt).contains("annualTotalRevenue"));
    }

    #[test]
    fn test_parse_orders_rows_and_columns() {
        let body = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": { "symbol": ["AAPL"], "type": ["annualTotalRevenue"] },
                        "annualTotalRevenue": [
                            point("2022-09-30", 394328000000.0),
                            point("2023-09-30", 383285000000.0)
                        ]
                    },
                    {
                        "meta": { "symbol": ["AAPL"], "type": ["annualNetIncome"] },
                        "annualNetIncome": [null, point("2023-09-30", 96995000000.0)]
                    },
                    {
                        "meta": { "symbol": ["AAPL"], "type": ["annualEBIT"] }
                    }
                ],
                "error": null
            }
        });

        let table = parse_timeseries(FinancialType::IncomeStmt, &body).unwrap();
        assert_eq!(table.metrics(), &["NetIncome".to_string(), "TotalRevenue".to_string()]);

        let records = table.to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["date"], "2023-09-30");
        assert_eq!(records[0]["TotalRevenue"], 383285000000.0);
        assert_eq!(records[1]["date"], "2022-09-30");
        assert_eq!(records[1]["NetIncome"], Value::Null);
    }

    #[test]
    fn test_no_results_is_empty_table() {
        let body = json!({ "timeseries": { "result": [], "error": null } });
        let table = parse_timeseries(FinancialType::BalanceSheet, &body).unwrap();
        assert!(table.is_empty());
        assert!(table.to_records().is_empty());
    }

    #[test]
    fn test_other_frequency_is_ignored() {
        let body = json!({
            "timeseries": {
                "result": [{
                    "meta": { "type": ["quarterlyTotalRevenue"] },
                    "quarterlyTotalRevenue": [point("2024-06-30", 1.0)]
                }]
            }
        });
        assert!(parse_timeseries(FinancialType::IncomeStmt, &body).unwrap().is_empty());
    }
}
