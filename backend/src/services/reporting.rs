//! Reporting: ledger rollups, dashboard reads, and CSV export
//!
//! The rollup job is the one component that reads ledger internals and
//! feeds the period metrics store. It runs out-of-band from live writes,
//! triggered per period.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{metric_names, PeriodType};

use crate::cache::{business_tag, metrics_tag, TagCache};
use crate::error::{AppError, AppResult};
use crate::services::metrics::UpsertMetricInput;
use crate::services::MetricsService;

#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
    cache: TagCache,
}

/// Result of one monthly rollup run
#[derive(Debug, Clone, Serialize)]
pub struct RollupSummary {
    pub period: NaiveDate,
    pub gross_revenue: Decimal,
    pub purchase_cost: Decimal,
    pub gross_profit: Decimal,
    pub transaction_count: i64,
    pub units_sold: Decimal,
}

/// Dashboard snapshot for a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub gross_revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub total_stock: Decimal,
    pub recent_transactions: i64,
}

#[derive(Debug, FromRow)]
struct MonthlyTotals {
    gross_revenue: Decimal,
    purchase_cost: Decimal,
    transaction_count: i64,
    units_sold: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool, cache: TagCache) -> Self {
        Self { db, cache }
    }

    /// Compute and persist the monthly metric rollup
    ///
    /// Reads SALE and PURCHASE sums from the ledger for the month containing
    /// `date`, then upserts the derived metrics. Re-running for the same
    /// month replaces the previous values.
    pub async fn compute_monthly_rollup(
        &self,
        business_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<RollupSummary> {
        let period = PeriodType::Monthly.anchor(date);
        let from = month_start_utc(period);
        let to = month_start_utc(next_month(period)?);

        let totals = sqlx::query_as::<_, MonthlyTotals>(
            r#"
            SELECT
                COALESCE(SUM(COALESCE(amount, 0)) FILTER (WHERE transaction_type = 'sale'), 0) AS gross_revenue,
                COALESCE(SUM(COALESCE(amount, 0)) FILTER (WHERE transaction_type = 'purchase'), 0) AS purchase_cost,
                COUNT(*) AS transaction_count,
                COALESCE(SUM(quantity) FILTER (WHERE transaction_type = 'sale'), 0) AS units_sold
            FROM transactions
            WHERE business_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(business_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        let summary = RollupSummary {
            period,
            gross_revenue: totals.gross_revenue,
            purchase_cost: totals.purchase_cost,
            gross_profit: totals.gross_revenue - totals.purchase_cost,
            transaction_count: totals.transaction_count,
            units_sold: totals.units_sold,
        };

        let metrics = MetricsService::new(self.db.clone(), self.cache.clone());
        let values = [
            (metric_names::GROSS_REVENUE, summary.gross_revenue),
            (metric_names::PURCHASE_COST, summary.purchase_cost),
            (metric_names::GROSS_PROFIT, summary.gross_profit),
            (
                metric_names::TRANSACTION_COUNT,
                Decimal::from(summary.transaction_count),
            ),
            (metric_names::UNITS_SOLD, summary.units_sold),
        ];
        for (name, value) in values {
            metrics
                .upsert_metric(
                    business_id,
                    UpsertMetricInput {
                        name: name.to_string(),
                        period_type: PeriodType::Monthly,
                        period,
                        value,
                    },
                )
                .await?;
        }

        tracing::info!(%business_id, %period, "monthly rollup computed");

        Ok(summary)
    }

    /// Dashboard summary, cached per business until the next mutation
    pub async fn get_dashboard_summary(&self, business_id: Uuid) -> AppResult<DashboardSummary> {
        let cache_key = format!("dashboard:{business_id}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(summary) = serde_json::from_value::<DashboardSummary>(cached) {
                return Ok(summary);
            }
        }

        let metrics = MetricsService::new(self.db.clone(), self.cache.clone());
        let latest = metrics
            .get_latest(
                business_id,
                &[
                    metric_names::GROSS_REVENUE.to_string(),
                    metric_names::GROSS_PROFIT.to_string(),
                ],
            )
            .await?;

        let total_stock: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_records WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let recent_transactions: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE business_id = $1 AND created_at >= NOW() - INTERVAL '7 days'
            "#,
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let summary = DashboardSummary {
            gross_revenue: latest.get(metric_names::GROSS_REVENUE).copied(),
            gross_profit: latest.get(metric_names::GROSS_PROFIT).copied(),
            total_stock,
            recent_transactions,
        };

        if let Ok(value) = serde_json::to_value(&summary) {
            self.cache
                .put(
                    cache_key,
                    value,
                    &[business_tag(business_id), metrics_tag(business_id)],
                )
                .await;
        }

        Ok(summary)
    }

    /// Export a time range of transactions as CSV
    pub async fn export_transactions_csv(
        &self,
        business_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<String> {
        let ledger = crate::services::LedgerService::new(self.db.clone(), self.cache.clone());
        let transactions = ledger.list_by_time_range(business_id, from, to).await?;
        Self::export_to_csv(&transactions)
    }

    /// Serialize records to a CSV string
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::StorageFailure(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::StorageFailure(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::StorageFailure(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

fn month_start_utc(period: NaiveDate) -> DateTime<Utc> {
    period.and_time(NaiveTime::MIN).and_utc()
}

fn next_month(period: NaiveDate) -> AppResult<NaiveDate> {
    period
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::ValidationError("Period out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_month_rolls_year() {
        assert_eq!(next_month(date(2024, 12, 1)).unwrap(), date(2025, 1, 1));
    }

    #[test]
    fn test_month_bounds_cover_whole_month() {
        let period = PeriodType::Monthly.anchor(date(2024, 2, 14));
        let from = month_start_utc(period);
        let to = month_start_utc(next_month(period).unwrap());
        assert_eq!(from.date_naive(), date(2024, 2, 1));
        assert_eq!(to.date_naive(), date(2024, 3, 1));
    }
}
