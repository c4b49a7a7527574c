//! Period metrics store
//!
//! Named numeric facts keyed by (business, name, period type, period).
//! The store knows nothing about transaction internals; the reporting job
//! computes values from the ledger and upserts them here.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validation, PeriodType};

use crate::cache::{business_tag, metrics_tag, TagCache};
use crate::error::{AppError, AppResult};

/// Stored period metric
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PeriodMetricRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub period_type: String,
    pub period: NaiveDate,
    pub value: Decimal,
    pub computed_at: DateTime<Utc>,
}

/// Input for upserting a metric value
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMetricInput {
    pub name: String,
    pub period_type: PeriodType,
    /// Any date inside the target period; normalized to the period anchor
    pub period: NaiveDate,
    pub value: Decimal,
}

/// All metric values for one period
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSnapshot {
    pub period: NaiveDate,
    pub values: HashMap<String, Decimal>,
}

#[derive(Clone)]
pub struct MetricsService {
    db: PgPool,
    cache: TagCache,
}

impl MetricsService {
    pub fn new(db: PgPool, cache: TagCache) -> Self {
        Self { db, cache }
    }

    /// Idempotent replace of the value for (business, name, period type, period)
    pub async fn upsert_metric(
        &self,
        business_id: Uuid,
        input: UpsertMetricInput,
    ) -> AppResult<PeriodMetricRow> {
        validation::validate_metric_name(&input.name)
            .map_err(|msg| AppError::missing("name", msg))?;

        let period = input.period_type.anchor(input.period);

        let metric = sqlx::query_as::<_, PeriodMetricRow>(
            r#"
            INSERT INTO period_metrics (business_id, name, period_type, period, value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (business_id, name, period_type, period)
            DO UPDATE SET value = EXCLUDED.value, computed_at = NOW()
            RETURNING id, business_id, name, period_type, period, value, computed_at
            "#,
        )
        .bind(business_id)
        .bind(&input.name)
        .bind(input.period_type.as_str())
        .bind(period)
        .bind(input.value)
        .fetch_one(&self.db)
        .await?;

        self.cache
            .invalidate(&[metrics_tag(business_id), business_tag(business_id)])
            .await;

        Ok(metric)
    }

    /// All metric values recorded for one period
    pub async fn get_metrics_for_period(
        &self,
        business_id: Uuid,
        period_type: PeriodType,
        period: NaiveDate,
    ) -> AppResult<HashMap<String, Decimal>> {
        let period = period_type.anchor(period);

        let rows = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT name, value
            FROM period_metrics
            WHERE business_id = $1 AND period_type = $2 AND period = $3
            "#,
        )
        .bind(business_id)
        .bind(period_type.as_str())
        .bind(period)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// History of the named metrics, grouped by period, newest period first
    pub async fn get_history(
        &self,
        business_id: Uuid,
        names: &[String],
        period_type: PeriodType,
    ) -> AppResult<Vec<PeriodSnapshot>> {
        if names.is_empty() {
            return Err(AppError::missing("names", "At least one metric name is required"));
        }

        let rows = sqlx::query_as::<_, (NaiveDate, String, Decimal)>(
            r#"
            SELECT period, name, value
            FROM period_metrics
            WHERE business_id = $1 AND period_type = $2 AND name = ANY($3)
            ORDER BY period DESC, name ASC
            "#,
        )
        .bind(business_id)
        .bind(period_type.as_str())
        .bind(names)
        .fetch_all(&self.db)
        .await?;

        // Rows arrive ordered by period descending; fold adjacent periods
        let mut snapshots: Vec<PeriodSnapshot> = Vec::new();
        for (period, name, value) in rows {
            match snapshots.last_mut() {
                Some(snapshot) if snapshot.period == period => {
                    snapshot.values.insert(name, value);
                }
                _ => {
                    let mut values = HashMap::new();
                    values.insert(name, value);
                    snapshots.push(PeriodSnapshot { period, values });
                }
            }
        }

        Ok(snapshots)
    }

    /// Most recent value per named metric
    pub async fn get_latest(
        &self,
        business_id: Uuid,
        names: &[String],
    ) -> AppResult<HashMap<String, Decimal>> {
        if names.is_empty() {
            return Err(AppError::missing("names", "At least one metric name is required"));
        }

        let rows = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT DISTINCT ON (name) name, value
            FROM period_metrics
            WHERE business_id = $1 AND name = ANY($2)
            ORDER BY name, period DESC
            "#,
        )
        .bind(business_id)
        .bind(names)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
