//! Period metric models

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reporting period granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Daily,
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::Yearly => "yearly",
        }
    }

    /// Normalize any date inside a period to that period's anchor date
    ///
    /// Monthly periods anchor on the first of the month, quarterly on the
    /// first of the quarter's opening month, yearly on January 1st. Daily
    /// periods anchor on the date itself.
    pub fn anchor(&self, date: NaiveDate) -> NaiveDate {
        match self {
            PeriodType::Daily => date,
            PeriodType::Monthly => first_of_month(date.year(), date.month()),
            PeriodType::Quarterly => {
                let quarter_month = ((date.month() - 1) / 3) * 3 + 1;
                first_of_month(date.year(), quarter_month)
            }
            PeriodType::Yearly => first_of_month(date.year(), 1),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Valid for every month 1..=12, which is all anchor() can pass
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid month anchor")
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(PeriodType::Daily),
            "monthly" => Ok(PeriodType::Monthly),
            "quarterly" => Ok(PeriodType::Quarterly),
            "yearly" => Ok(PeriodType::Yearly),
            other => Err(format!("unknown period type: {other}")),
        }
    }
}

/// Well-known metric names produced by the rollup job
pub mod metric_names {
    pub const GROSS_REVENUE: &str = "grossRevenue";
    pub const PURCHASE_COST: &str = "purchaseCost";
    pub const GROSS_PROFIT: &str = "grossProfit";
    pub const TRANSACTION_COUNT: &str = "transactionCount";
    pub const UNITS_SOLD: &str = "unitsSold";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_anchor() {
        assert_eq!(
            PeriodType::Monthly.anchor(date(2024, 1, 17)),
            date(2024, 1, 1)
        );
    }

    #[test]
    fn test_monthly_anchor_is_idempotent() {
        let anchor = PeriodType::Monthly.anchor(date(2024, 6, 30));
        assert_eq!(PeriodType::Monthly.anchor(anchor), anchor);
    }

    #[test]
    fn test_quarterly_anchor() {
        assert_eq!(
            PeriodType::Quarterly.anchor(date(2024, 8, 9)),
            date(2024, 7, 1)
        );
        assert_eq!(
            PeriodType::Quarterly.anchor(date(2024, 12, 31)),
            date(2024, 10, 1)
        );
    }

    #[test]
    fn test_yearly_anchor() {
        assert_eq!(
            PeriodType::Yearly.anchor(date(2024, 11, 5)),
            date(2024, 1, 1)
        );
    }

    #[test]
    fn test_daily_anchor_is_identity() {
        let d = date(2024, 2, 29);
        assert_eq!(PeriodType::Daily.anchor(d), d);
    }
}
