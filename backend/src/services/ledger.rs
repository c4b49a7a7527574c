//! The inventory transaction ledger
//!
//! Write path: validate, resolve the target stock record, then one atomic
//! unit of work that inserts the transaction row, applies the signed delta
//! to the stock record with an atomic column increment, and appends the
//! audit entry. Read path: business-scoped, newest-first listings with
//! offset pagination and display-name joins.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validation, AuditAction, Page, PageParams, TransactionType};

use crate::cache::{business_tag, stock_record_tag, TagCache};
use crate::error::{AppError, AppResult};
use crate::services::audit::{AuditInput, AuditedUnitOfWork};
use crate::services::stock::StockRecordRow;
use crate::services::{CatalogService, StockService};

/// Entity kind tag used for stock record audit entries
pub const STOCK_RECORD_ENTITY: &str = "stock_record";

/// Ledger service: transaction creation and queries
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
    cache: TagCache,
}

/// Input for recording a ledger transaction
#[derive(Debug, Deserialize)]
pub struct RecordTransactionInput {
    pub product_id: Uuid,
    pub transaction_type: TransactionType,
    /// Positive magnitude; the applied sign comes from the type
    pub quantity: Decimal,
    pub amount: Option<Decimal>,
    pub reference: Option<String>,
    /// Target stock record, when the caller already holds one
    pub stock_record_id: Option<Uuid>,
    /// Required when no stock_record_id is supplied
    pub warehouse_id: Option<Uuid>,
    /// Sourcing counterparty for purchase flows
    pub supplier_id: Option<Uuid>,
}

/// Stored ledger transaction
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub stock_record_id: Uuid,
    pub transaction_type: String,
    pub quantity: Decimal,
    pub amount: Option<Decimal>,
    pub reference: Option<String>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Ledger transaction joined with display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionWithNames {
    pub id: Uuid,
    pub business_id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub stock_record_id: Uuid,
    pub transaction_type: String,
    pub quantity: Decimal,
    pub amount: Option<Decimal>,
    pub reference: Option<String>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub warehouse_name: String,
    pub performed_by_name: Option<String>,
}

const SELECT_WITH_NAMES: &str = r#"
    SELECT t.id, t.business_id, t.product_id, t.warehouse_id, t.stock_record_id,
           t.transaction_type, t.quantity, t.amount, t.reference, t.performed_by,
           t.created_at,
           p.name AS product_name,
           w.name AS warehouse_name,
           u.display_name AS performed_by_name
    FROM transactions t
    JOIN products p ON p.id = t.product_id
    JOIN warehouses w ON w.id = t.warehouse_id
    LEFT JOIN users u ON u.id = t.performed_by
"#;

impl LedgerService {
    pub fn new(db: PgPool, cache: TagCache) -> Self {
        Self { db, cache }
    }

    /// Record one stock-affecting business event
    ///
    /// The transaction row, the stock delta, and the audit entry commit in
    /// one unit of work; a failure anywhere rolls all three back. The stock
    /// update is an atomic column increment, so concurrent writers against
    /// the same record never lose updates.
    pub async fn record_transaction(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        input: RecordTransactionInput,
    ) -> AppResult<TransactionRow> {
        validation::validate_quantity(input.quantity)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        validation::validate_amount(input.amount)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let catalog = CatalogService::new(self.db.clone());
        if !catalog.product_exists(business_id, input.product_id).await? {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let stock = StockService::new(self.db.clone());
        let record = self.target_stock_record(business_id, &input, &stock).await?;

        let delta = input.transaction_type.signed_delta(input.quantity);

        let mut uow = AuditedUnitOfWork::begin(&self.db, business_id, user_id).await?;

        let transaction = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (
                business_id, product_id, warehouse_id, stock_record_id,
                transaction_type, quantity, amount, reference, performed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, business_id, product_id, warehouse_id, stock_record_id,
                      transaction_type, quantity, amount, reference, performed_by, created_at
            "#,
        )
        .bind(business_id)
        .bind(input.product_id)
        .bind(record.warehouse_id)
        .bind(record.id)
        .bind(input.transaction_type.as_str())
        .bind(input.quantity)
        .bind(input.amount)
        .bind(&input.reference)
        .bind(user_id)
        .fetch_one(uow.conn())
        .await?;

        // Atomic increment; never a read-modify-write in application code
        let updated = sqlx::query_as::<_, StockRecordRow>(
            r#"
            UPDATE stock_records
            SET quantity = quantity + $1, last_updated = NOW()
            WHERE id = $2
            RETURNING id, business_id, warehouse_id, product_id, quantity, last_updated
            "#,
        )
        .bind(delta)
        .bind(record.id)
        .fetch_one(uow.conn())
        .await?;

        let audit = AuditInput::new(
            STOCK_RECORD_ENTITY,
            updated.id,
            AuditAction::Update,
            &updated,
        )?;
        uow.commit_with_audit(audit).await?;

        self.cache
            .invalidate(&[business_tag(business_id), stock_record_tag(updated.id)])
            .await;

        Ok(transaction)
    }

    /// Resolve the stock record a transaction targets
    async fn target_stock_record(
        &self,
        business_id: Uuid,
        input: &RecordTransactionInput,
        stock: &StockService,
    ) -> AppResult<StockRecordRow> {
        if let Some(stock_record_id) = input.stock_record_id {
            let record = stock.get(business_id, stock_record_id).await?;
            if record.product_id != input.product_id {
                return Err(AppError::ValidationError(
                    "Stock record does not belong to the given product".to_string(),
                ));
            }
            return Ok(record);
        }

        let warehouse_id = input.warehouse_id.ok_or_else(|| {
            AppError::missing(
                "warehouse_id",
                "Either stock_record_id or warehouse_id is required",
            )
        })?;

        if input.transaction_type == TransactionType::Purchase {
            stock
                .resolve_for_purchase(
                    business_id,
                    warehouse_id,
                    input.product_id,
                    Decimal::ZERO,
                    input.supplier_id,
                )
                .await
        } else {
            stock
                .resolve(business_id, warehouse_id, input.product_id, Decimal::ZERO)
                .await
        }
    }

    /// Most recent transactions with display names, newest first
    pub async fn list_recent(
        &self,
        business_id: Uuid,
        limit: Option<i64>,
    ) -> AppResult<Vec<TransactionWithNames>> {
        let limit = limit.unwrap_or(50).clamp(1, 500);

        let query = format!(
            "{SELECT_WITH_NAMES} WHERE t.business_id = $1 ORDER BY t.created_at DESC LIMIT $2"
        );
        let transactions = sqlx::query_as::<_, TransactionWithNames>(&query)
            .bind(business_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        Ok(transactions)
    }

    /// One page of transactions plus total row and page counts
    pub async fn list_paginated(
        &self,
        business_id: Uuid,
        params: PageParams,
    ) -> AppResult<Page<TransactionWithNames>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM transactions WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let query = format!(
            "{SELECT_WITH_NAMES} WHERE t.business_id = $1 ORDER BY t.created_at DESC OFFSET $2 LIMIT $3"
        );
        let items = sqlx::query_as::<_, TransactionWithNames>(&query)
            .bind(business_id)
            .bind(params.offset())
            .bind(params.page_size())
            .fetch_all(&self.db)
            .await?;

        Ok(Page::new(items, total, params.page(), params.page_size()))
    }

    /// Transactions in an inclusive creation-time range, lean rows
    pub async fn list_by_time_range(
        &self,
        business_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<TransactionRow>> {
        let transactions = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, business_id, product_id, warehouse_id, stock_record_id,
                   transaction_type, quantity, amount, reference, performed_by, created_at
            FROM transactions
            WHERE business_id = $1 AND created_at BETWEEN $2 AND $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }

    /// Time-range listing joined with related display fields
    pub async fn list_by_time_range_with_names(
        &self,
        business_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<TransactionWithNames>> {
        let query = format!(
            "{SELECT_WITH_NAMES} WHERE t.business_id = $1 AND t.created_at BETWEEN $2 AND $3 ORDER BY t.created_at DESC"
        );
        let transactions = sqlx::query_as::<_, TransactionWithNames>(&query)
            .bind(business_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.db)
            .await?;

        Ok(transactions)
    }

    /// Get one transaction within the caller's business scope
    pub async fn get_by_id(
        &self,
        business_id: Uuid,
        transaction_id: Uuid,
    ) -> AppResult<TransactionRow> {
        let transaction = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, business_id, product_id, warehouse_id, stock_record_id,
                   transaction_type, quantity, amount, reference, performed_by, created_at
            FROM transactions
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(transaction_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        Ok(transaction)
    }

    /// Transactions of one type, newest first
    pub async fn list_by_type(
        &self,
        business_id: Uuid,
        type_param: Option<&str>,
    ) -> AppResult<Vec<TransactionRow>> {
        let raw = validation::require_text(type_param)
            .map_err(|_| AppError::missing("type", "Transaction type is required"))?;

        let transaction_type: TransactionType = raw
            .parse()
            .map_err(|e: shared::UnknownTransactionType| AppError::ValidationError(e.to_string()))?;

        let transactions = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, business_id, product_id, warehouse_id, stock_record_id,
                   transaction_type, quantity, amount, reference, performed_by, created_at
            FROM transactions
            WHERE business_id = $1 AND transaction_type = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .bind(transaction_type.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_matches_type_table() {
        let qty = Decimal::from(5);
        assert_eq!(TransactionType::Sale.signed_delta(qty), Decimal::from(-5));
        assert_eq!(TransactionType::Purchase.signed_delta(qty), Decimal::from(5));
    }

    #[test]
    fn test_blank_type_filter_is_rejected_before_storage() {
        let err = validation::require_text(Some("  "));
        assert!(err.is_err());
    }
}
