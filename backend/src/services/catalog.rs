//! Master-data existence checks consumed by the ledger
//!
//! Product, warehouse, and supplier CRUD live elsewhere in the platform;
//! the ledger only needs scope-checked lookups.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn product_exists(&self, business_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND business_id = $2)",
        )
        .bind(product_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    pub async fn warehouse_exists(&self, business_id: Uuid, warehouse_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1 AND business_id = $2)",
        )
        .bind(warehouse_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    pub async fn supplier_exists(&self, business_id: Uuid, supplier_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1 AND business_id = $2)",
        )
        .bind(supplier_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }
}
