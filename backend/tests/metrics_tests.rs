//! Period metrics tests
//!
//! Covers period anchor normalization, upsert last-write-wins semantics,
//! and rollup arithmetic.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{validate_metric_name, PeriodType};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Key the metrics store deduplicates on
type MetricKey = (String, PeriodType, NaiveDate);

/// Simulate the store's upsert against an in-memory map
fn simulate_upsert(
    store: &mut HashMap<MetricKey, Decimal>,
    name: &str,
    period_type: PeriodType,
    period: NaiveDate,
    value: Decimal,
) {
    let key = (name.to_string(), period_type, period_type.anchor(period));
    store.insert(key, value);
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Two upserts for the same key leave exactly one value, the second
    #[test]
    fn test_upsert_replaces_prior_value() {
        let mut store = HashMap::new();
        simulate_upsert(
            &mut store,
            "grossRevenue",
            PeriodType::Monthly,
            date(2024, 1, 1),
            dec("1000"),
        );
        simulate_upsert(
            &mut store,
            "grossRevenue",
            PeriodType::Monthly,
            date(2024, 1, 1),
            dec("1200"),
        );

        assert_eq!(store.len(), 1);
        let key = (
            "grossRevenue".to_string(),
            PeriodType::Monthly,
            date(2024, 1, 1),
        );
        assert_eq!(store.get(&key), Some(&dec("1200")));
    }

    /// Dates inside the same month collapse to one monthly key
    #[test]
    fn test_same_month_dates_share_a_key() {
        let mut store = HashMap::new();
        simulate_upsert(
            &mut store,
            "grossRevenue",
            PeriodType::Monthly,
            date(2024, 1, 3),
            dec("100"),
        );
        simulate_upsert(
            &mut store,
            "grossRevenue",
            PeriodType::Monthly,
            date(2024, 1, 28),
            dec("200"),
        );

        assert_eq!(store.len(), 1);
    }

    /// Different names and periods never collide
    #[test]
    fn test_distinct_keys_coexist() {
        let mut store = HashMap::new();
        simulate_upsert(
            &mut store,
            "grossRevenue",
            PeriodType::Monthly,
            date(2024, 1, 1),
            dec("100"),
        );
        simulate_upsert(
            &mut store,
            "grossProfit",
            PeriodType::Monthly,
            date(2024, 1, 1),
            dec("40"),
        );
        simulate_upsert(
            &mut store,
            "grossRevenue",
            PeriodType::Monthly,
            date(2024, 2, 1),
            dec("150"),
        );

        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_monthly_anchor_first_of_month() {
        assert_eq!(
            PeriodType::Monthly.anchor(date(2024, 7, 19)),
            date(2024, 7, 1)
        );
    }

    #[test]
    fn test_profit_is_revenue_minus_cost() {
        let revenue = dec("5400.50");
        let cost = dec("3200.25");
        assert_eq!(revenue - cost, dec("2200.25"));
    }

    #[test]
    fn test_metric_name_validation() {
        assert!(validate_metric_name("grossRevenue").is_ok());
        assert!(validate_metric_name("  ").is_err());
    }

    /// History rows sorted by period descending group newest-first
    #[test]
    fn test_history_grouping_preserves_descending_order() {
        let rows = vec![
            (date(2024, 3, 1), "grossRevenue", dec("300")),
            (date(2024, 3, 1), "grossProfit", dec("90")),
            (date(2024, 2, 1), "grossRevenue", dec("200")),
            (date(2024, 1, 1), "grossRevenue", dec("100")),
        ];

        let mut periods: Vec<NaiveDate> = Vec::new();
        for (period, _, _) in &rows {
            if periods.last() != Some(period) {
                periods.push(*period);
            }
        }

        assert_eq!(
            periods,
            vec![date(2024, 3, 1), date(2024, 2, 1), date(2024, 1, 1)]
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn value_strategy() -> impl Strategy<Value = Decimal> {
        (-1_000_000i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..2100, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn period_type_strategy() -> impl Strategy<Value = PeriodType> {
        prop_oneof![
            Just(PeriodType::Daily),
            Just(PeriodType::Monthly),
            Just(PeriodType::Quarterly),
            Just(PeriodType::Yearly),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Anchoring is idempotent for every period type
        #[test]
        fn prop_anchor_idempotent(
            period_type in period_type_strategy(),
            d in date_strategy()
        ) {
            let anchor = period_type.anchor(d);
            prop_assert_eq!(period_type.anchor(anchor), anchor);
        }

        /// The anchor never lies after the date it normalizes
        #[test]
        fn prop_anchor_not_after_date(
            period_type in period_type_strategy(),
            d in date_strategy()
        ) {
            prop_assert!(period_type.anchor(d) <= d);
        }

        /// The last upsert for a key always wins, regardless of how many
        /// writes preceded it
        #[test]
        fn prop_last_upsert_wins(
            values in prop::collection::vec(value_strategy(), 1..20),
            d in date_strategy()
        ) {
            let mut store = HashMap::new();
            for v in &values {
                simulate_upsert(&mut store, "m", PeriodType::Monthly, d, *v);
            }

            prop_assert_eq!(store.len(), 1);
            let key = ("m".to_string(), PeriodType::Monthly, PeriodType::Monthly.anchor(d));
            prop_assert_eq!(store.get(&key), values.last());
        }

        /// Upserting under different names never shrinks the store
        #[test]
        fn prop_distinct_names_accumulate(
            names in prop::collection::hash_set("[a-z]{1,8}", 1..10),
            d in date_strategy(),
            value in value_strategy()
        ) {
            let mut store = HashMap::new();
            for name in &names {
                simulate_upsert(&mut store, name, PeriodType::Monthly, d, value);
            }
            prop_assert_eq!(store.len(), names.len());
        }
    }
}
