//! Ledger behavior tests
//!
//! Covers the signed-delta table, delta application against stock
//! quantities, pagination math, and the audit payload shape.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{total_page_count, Page, PageParams, TransactionType};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Apply one transaction's delta to a stock quantity
fn apply_delta(current: Decimal, transaction_type: TransactionType, quantity: Decimal) -> Decimal {
    current + transaction_type.signed_delta(quantity)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A sale of 5 against a quantity of 20 leaves 15
    #[test]
    fn test_sale_reduces_stock() {
        let result = apply_delta(dec("20"), TransactionType::Sale, dec("5"));
        assert_eq!(result, dec("15"));
    }

    /// A purchase of 10 against a fresh record leaves exactly 10
    #[test]
    fn test_purchase_into_empty_record() {
        let result = apply_delta(Decimal::ZERO, TransactionType::Purchase, dec("10"));
        assert_eq!(result, dec("10"));
    }

    #[test]
    fn test_damage_reduces_stock() {
        let result = apply_delta(dec("8"), TransactionType::Damage, dec("3"));
        assert_eq!(result, dec("5"));
    }

    #[test]
    fn test_transfer_adds_stock() {
        let result = apply_delta(dec("2"), TransactionType::Transfer, dec("4"));
        assert_eq!(result, dec("6"));
    }

    /// Overselling is representable: the ledger does not floor at zero
    #[test]
    fn test_oversell_goes_negative() {
        let result = apply_delta(dec("3"), TransactionType::Sale, dec("5"));
        assert_eq!(result, dec("-2"));
    }

    /// Two transactions with identical values apply two deltas
    #[test]
    fn test_no_dedup_by_value() {
        let after_first = apply_delta(dec("20"), TransactionType::Sale, dec("5"));
        let after_second = apply_delta(after_first, TransactionType::Sale, dec("5"));
        assert_eq!(after_second, dec("10"));
    }

    #[test]
    fn test_type_strings_are_stable() {
        assert_eq!(TransactionType::Sale.as_str(), "sale");
        assert_eq!(TransactionType::Purchase.as_str(), "purchase");
        assert_eq!(TransactionType::Damage.as_str(), "damage");
        assert_eq!(TransactionType::Transfer.as_str(), "transfer");
    }

    #[test]
    fn test_page_count_matches_ceiling() {
        assert_eq!(total_page_count(0, 50), 0);
        assert_eq!(total_page_count(1, 50), 1);
        assert_eq!(total_page_count(50, 50), 1);
        assert_eq!(total_page_count(51, 50), 2);
    }

    #[test]
    fn test_page_assembly() {
        let page = Page::new(vec![1, 2, 3], 103, 1, 50);
        assert_eq!(page.total, 103);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_size, 50);
    }

    #[test]
    fn test_default_pagination_is_first_page_of_50() {
        let params = PageParams {
            page: None,
            page_size: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 50);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating valid quantities (positive decimals)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 10000.00
    }

    /// Strategy for generating stock quantities (any sign)
    fn stock_strategy() -> impl Strategy<Value = Decimal> {
        (-1_000_000i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn type_strategy() -> impl Strategy<Value = TransactionType> {
        prop_oneof![
            Just(TransactionType::Sale),
            Just(TransactionType::Purchase),
            Just(TransactionType::Damage),
            Just(TransactionType::Transfer),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The resulting quantity is always prior plus the signed delta
        #[test]
        fn prop_delta_applied_exactly_once(
            current in stock_strategy(),
            transaction_type in type_strategy(),
            quantity in quantity_strategy()
        ) {
            let result = apply_delta(current, transaction_type, quantity);
            prop_assert_eq!(result - current, transaction_type.signed_delta(quantity));
        }

        /// The delta magnitude always equals the quantity magnitude
        #[test]
        fn prop_delta_magnitude_preserved(
            transaction_type in type_strategy(),
            quantity in quantity_strategy()
        ) {
            let delta = transaction_type.signed_delta(quantity);
            prop_assert_eq!(delta.abs(), quantity);
        }

        /// Outbound types subtract, inbound types add
        #[test]
        fn prop_delta_sign_follows_type(
            transaction_type in type_strategy(),
            quantity in quantity_strategy()
        ) {
            let delta = transaction_type.signed_delta(quantity);
            if transaction_type.is_inbound() {
                prop_assert!(delta > Decimal::ZERO);
            } else {
                prop_assert!(delta < Decimal::ZERO);
            }
        }

        /// A sale followed by an equal purchase restores the prior quantity
        #[test]
        fn prop_sale_then_purchase_is_identity(
            current in stock_strategy(),
            quantity in quantity_strategy()
        ) {
            let after_sale = apply_delta(current, TransactionType::Sale, quantity);
            let restored = apply_delta(after_sale, TransactionType::Purchase, quantity);
            prop_assert_eq!(restored, current);
        }

        /// Applying n identical transactions scales the delta n times
        #[test]
        fn prop_repeated_transactions_accumulate(
            current in stock_strategy(),
            transaction_type in type_strategy(),
            quantity in quantity_strategy(),
            n in 1usize..20
        ) {
            let mut running = current;
            for _ in 0..n {
                running = apply_delta(running, transaction_type, quantity);
            }
            let expected = current
                + transaction_type.signed_delta(quantity) * Decimal::from(n as u64);
            prop_assert_eq!(running, expected);
        }

        /// total_pages is the exact ceiling of total / page_size
        #[test]
        fn prop_total_pages_is_ceiling(
            total in 0i64..1_000_000,
            page_size in 1i64..1_000
        ) {
            let pages = total_page_count(total, page_size);
            // Enough pages to hold every row
            prop_assert!(pages * page_size >= total);
            // But not one page more than needed
            prop_assert!((pages - 1) * page_size < total || total == 0);
        }

        /// A page never reports more rows than its page size
        #[test]
        fn prop_page_items_bounded(
            total in 0i64..10_000,
            page in 1i64..100,
            page_size in 1i64..200
        ) {
            let params = PageParams { page: Some(page), page_size: Some(page_size) };
            let offset = params.offset();
            // Rows the storage layer would return for this window
            let returned = (total - offset).clamp(0, page_size);
            prop_assert!(returned <= page_size);
        }
    }
}

// ============================================================================
// Audit payload tests
// ============================================================================

#[cfg(test)]
mod audit_tests {
    use ops_platform_backend::services::audit::AuditInput;
    use serde::Serialize;
    use shared::AuditAction;
    use uuid::Uuid;

    #[derive(Serialize)]
    struct Snapshot {
        id: Uuid,
        quantity: String,
    }

    /// The audit payload carries the serialized post-mutation state
    #[test]
    fn test_audit_input_snapshot_round_trip() {
        let id = Uuid::new_v4();
        let snapshot = Snapshot {
            id,
            quantity: "15".to_string(),
        };

        let input = AuditInput::new("stock_record", id, AuditAction::Update, &snapshot).unwrap();

        assert_eq!(input.entity_kind, "stock_record");
        assert_eq!(input.entity_id, id);
        assert_eq!(input.action.as_str(), "update");
        assert_eq!(input.changes["quantity"], "15");
    }
}

// ============================================================================
// Cache invalidation tests
// ============================================================================

#[cfg(test)]
mod cache_tests {
    use ops_platform_backend::cache::{business_tag, stock_record_tag, TagCache};
    use serde_json::json;
    use uuid::Uuid;

    /// A mutation's tag invalidation clears every read cached for the business
    #[tokio::test]
    async fn test_business_mutation_clears_cached_reads() {
        let cache = TagCache::new();
        let business_id = Uuid::new_v4();
        let record_id = Uuid::new_v4();

        cache
            .put(
                format!("recent:{business_id}"),
                json!([{"id": 1}]),
                &[business_tag(business_id)],
            )
            .await;
        cache
            .put(
                format!("stock:{record_id}"),
                json!({"quantity": "20"}),
                &[business_tag(business_id), stock_record_tag(record_id)],
            )
            .await;

        cache
            .invalidate(&[business_tag(business_id), stock_record_tag(record_id)])
            .await;

        assert_eq!(cache.get(&format!("recent:{business_id}")).await, None);
        assert_eq!(cache.get(&format!("stock:{record_id}")).await, None);
    }

    /// Invalidation is scoped: other businesses keep their cached reads
    #[tokio::test]
    async fn test_invalidation_does_not_cross_tenants() {
        let cache = TagCache::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        cache.put("a", json!(1), &[business_tag(a)]).await;
        cache.put("b", json!(2), &[business_tag(b)]).await;

        cache.invalidate(&[business_tag(a)]).await;

        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(json!(2)));
    }
}
