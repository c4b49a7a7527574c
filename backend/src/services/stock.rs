//! Stock record resolution and reads
//!
//! One stock record exists per (warehouse, product) pair. Resolution is a
//! single atomic insert-or-return-existing statement: the uniqueness
//! constraint settles concurrent first movements at the storage layer, so
//! two racing callers converge on the same row without retries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::CatalogService;

/// Stored stock record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockRecordRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Find or create the stock record for a (warehouse, product) pair
    ///
    /// An existing record is returned untouched; callers apply quantity
    /// changes through the ledger writer, never here. A concurrent creation
    /// of the same pair resolves to the row that won the insert.
    pub async fn resolve(
        &self,
        business_id: Uuid,
        warehouse_id: Uuid,
        product_id: Uuid,
        initial_quantity: Decimal,
    ) -> AppResult<StockRecordRow> {
        let catalog = CatalogService::new(self.db.clone());
        if !catalog.warehouse_exists(business_id, warehouse_id).await? {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        // The no-op DO UPDATE makes the conflicting row visible to RETURNING
        let record = sqlx::query_as::<_, StockRecordRow>(
            r#"
            INSERT INTO stock_records (business_id, warehouse_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (warehouse_id, product_id)
            DO UPDATE SET last_updated = stock_records.last_updated
            RETURNING id, business_id, warehouse_id, product_id, quantity, last_updated
            "#,
        )
        .bind(business_id)
        .bind(warehouse_id)
        .bind(product_id)
        .bind(initial_quantity)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    /// Resolve for a purchase flow, also establishing the sourcing link
    ///
    /// The sourcing row is traceability metadata, not a ledger invariant;
    /// the resolution succeeds whether or not the link lands.
    pub async fn resolve_for_purchase(
        &self,
        business_id: Uuid,
        warehouse_id: Uuid,
        product_id: Uuid,
        initial_quantity: Decimal,
        supplier_id: Option<Uuid>,
    ) -> AppResult<StockRecordRow> {
        let record = self
            .resolve(business_id, warehouse_id, product_id, initial_quantity)
            .await?;

        if let Some(supplier_id) = supplier_id {
            self.record_sourcing_link(business_id, product_id, supplier_id)
                .await;
        }

        Ok(record)
    }

    /// Record a product-sourcing link for a purchase flow
    ///
    /// Denormalized traceability row, best-effort: a failure here is logged
    /// and never fails the resolution that triggered it.
    pub async fn record_sourcing_link(
        &self,
        business_id: Uuid,
        product_id: Uuid,
        supplier_id: Uuid,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO product_suppliers (business_id, product_id, supplier_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(business_id)
        .bind(product_id)
        .bind(supplier_id)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                %product_id,
                %supplier_id,
                "failed to record product sourcing link: {e}"
            );
        }
    }

    /// Get a stock record by id within the caller's business scope
    pub async fn get(&self, business_id: Uuid, stock_record_id: Uuid) -> AppResult<StockRecordRow> {
        let record = sqlx::query_as::<_, StockRecordRow>(
            r#"
            SELECT id, business_id, warehouse_id, product_id, quantity, last_updated
            FROM stock_records
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(stock_record_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))?;

        Ok(record)
    }

    /// All stock records for a business, most recently moved first
    pub async fn list(&self, business_id: Uuid) -> AppResult<Vec<StockRecordRow>> {
        let records = sqlx::query_as::<_, StockRecordRow>(
            r#"
            SELECT id, business_id, warehouse_id, product_id, quantity, last_updated
            FROM stock_records
            WHERE business_id = $1
            ORDER BY last_updated DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Stock records for one warehouse
    pub async fn list_for_warehouse(
        &self,
        business_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Vec<StockRecordRow>> {
        let records = sqlx::query_as::<_, StockRecordRow>(
            r#"
            SELECT id, business_id, warehouse_id, product_id, quantity, last_updated
            FROM stock_records
            WHERE business_id = $1 AND warehouse_id = $2
            ORDER BY last_updated DESC
            "#,
        )
        .bind(business_id)
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }
}
