//! Closed parameter enumerations accepted by the finance tools.
//!
//! Every enumeration keeps a translation table to and from its wire string,
//! so tool arguments are validated once at the boundary and the rest of the
//! crate works with typed values.

use std::fmt;
use std::str::FromStr;

/// Error returned when a wire string is not part of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// Human name of the parameter kind, e.g. `"financial type"`.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Every accepted wire string, in declaration order.
    pub accepted: &'static [&'static str],
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} {}. Please use one of the following: {}.",
            self.kind,
            self.value,
            self.accepted.join(", ")
        )
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// All wire strings, in declaration order.
            pub const WIRE_NAMES: &'static [&'static str] = &[$($wire),+];

            /// The wire string of this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                        accepted: Self::WIRE_NAMES,
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Financial statement kinds (annual and quarterly flavours of three statements).
    FinancialType, "financial type" {
        IncomeStmt => "income_stmt",
        QuarterlyIncomeStmt => "quarterly_income_stmt",
        BalanceSheet => "balance_sheet",
        QuarterlyBalanceSheet => "quarterly_balance_sheet",
        Cashflow => "cashflow",
        QuarterlyCashflow => "quarterly_cashflow",
    }
}

wire_enum! {
    /// Ownership disclosure categories.
    HolderType, "holder type" {
        MajorHolders => "major_holders",
        InstitutionalHolders => "institutional_holders",
        MutualfundHolders => "mutualfund_holders",
        InsiderTransactions => "insider_transactions",
        InsiderPurchases => "insider_purchases",
        InsiderRosterHolders => "insider_roster_holders",
    }
}

wire_enum! {
    /// Analyst coverage views.
    RecommendationType, "recommendation type" {
        Recommendations => "recommendations",
        UpgradesDowngrades => "upgrades_downgrades",
    }
}

wire_enum! {
    /// Look-back window for price history.
    Period, "period" {
        OneDay => "1d",
        FiveDays => "5d",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
        SixMonths => "6mo",
        OneYear => "1y",
        TwoYears => "2y",
        FiveYears => "5y",
        TenYears => "10y",
        YearToDate => "ytd",
        Max => "max",
    }
}

wire_enum! {
    /// Bar size for price history. Intraday bars only reach back ~60 days upstream.
    Interval, "interval" {
        OneMinute => "1m",
        TwoMinutes => "2m",
        FiveMinutes => "5m",
        FifteenMinutes => "15m",
        ThirtyMinutes => "30m",
        SixtyMinutes => "60m",
        NinetyMinutes => "90m",
        OneHour => "1h",
        OneDay => "1d",
        FiveDays => "5d",
        OneWeek => "1wk",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::OneMonth
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::OneDay
    }
}

impl FinancialType {
    /// Whether the statement is reported per quarter rather than per fiscal year.
    pub fn is_quarterly(self) -> bool {
        matches!(
            self,
            Self::QuarterlyIncomeStmt | Self::QuarterlyBalanceSheet | Self::QuarterlyCashflow
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_type_round_trips_every_wire_name() {
        for kind in FinancialType::ALL {
            assert_eq!(kind.as_str().parse::<FinancialType>().unwrap(), *kind);
        }
        assert_eq!(FinancialType::ALL.len(), 6);
    }

    #[test]
    fn test_unknown_financial_type_lists_all_values() {
        let err = "income".parse::<FinancialType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid financial type income. Please use one of the following: income_stmt, \
             quarterly_income_stmt, balance_sheet, quarterly_balance_sheet, cashflow, \
             quarterly_cashflow."
        );
    }

    #[test]
    fn test_holder_type_has_six_variants() {
        assert_eq!(HolderType::ALL.len(), 6);
        assert_eq!(
            "insider_roster_holders".parse::<HolderType>(),
            Ok(HolderType::InsiderRosterHolders)
        );
        assert!("MAJOR_HOLDERS".parse::<HolderType>().is_err());
    }

    #[test]
    fn test_recommendation_type() {
        assert_eq!(RecommendationType::ALL.len(), 2);
        assert_eq!(
            "upgrades_downgrades".parse::<RecommendationType>(),
            Ok(RecommendationType::UpgradesDowngrades)
        );
    }

    #[test]
    fn test_period_and_interval_defaults() {
        assert_eq!(Period::default().as_str(), "1mo");
        assert_eq!(Interval::default().as_str(), "1d");
        assert_eq!(Period::ALL.len(), 11);
        assert_eq!(Interval::ALL.len(), 13);
        assert!("2d".parse::<Period>().is_err());
        assert_eq!("1wk".parse::<Interval>(), Ok(Interval::OneWeek));
    }

    #[test]
    fn test_quarterly_flag() {
        assert!(FinancialType::QuarterlyCashflow.is_quarterly());
        assert!(!FinancialType::BalanceSheet.is_quarterly());
    }
}
