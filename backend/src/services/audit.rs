//! Audit trail recording and queries
//!
//! Every mutation to a tracked entity commits together with exactly one
//! audit entry. The write side is structurally enforced: a mutating call
//! site opens an [`AuditedUnitOfWork`], whose only path to commit is
//! `commit_with_audit` — there is no way to land the mutation without
//! supplying the audit payload. If the audit insert fails, the whole unit
//! of work rolls back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::AuditAction;

use crate::error::{AppError, AppResult};

/// Payload describing the mutation a unit of work performed
#[derive(Debug, Clone)]
pub struct AuditInput {
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    /// Serialized post-mutation state of the entity
    pub changes: serde_json::Value,
}

impl AuditInput {
    pub fn new(
        entity_kind: &str,
        entity_id: Uuid,
        action: AuditAction,
        snapshot: &impl Serialize,
    ) -> AppResult<Self> {
        let changes = serde_json::to_value(snapshot)
            .map_err(|e| AppError::StorageFailure(format!("audit snapshot: {e}")))?;
        Ok(Self {
            entity_kind: entity_kind.to_string(),
            entity_id,
            action,
            changes,
        })
    }
}

/// A storage unit of work that cannot commit without an audit payload
pub struct AuditedUnitOfWork {
    tx: Transaction<'static, Postgres>,
    business_id: Uuid,
    performed_by: Uuid,
}

impl AuditedUnitOfWork {
    pub async fn begin(pool: &PgPool, business_id: Uuid, performed_by: Uuid) -> AppResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self {
            tx,
            business_id,
            performed_by,
        })
    }

    /// Executor for the mutating statements of this unit of work
    pub fn conn(&mut self) -> &mut sqlx::PgConnection {
        &mut self.tx
    }

    /// Append the audit entry and commit; all writes land or none do
    pub async fn commit_with_audit(mut self, audit: AuditInput) -> AppResult<()> {
        append_entry(&mut self.tx, self.business_id, self.performed_by, &audit).await?;
        self.tx.commit().await?;
        Ok(())
    }

    /// Abandon the unit of work, discarding every write
    pub async fn rollback(self) -> AppResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

async fn append_entry(
    conn: &mut sqlx::PgConnection,
    business_id: Uuid,
    performed_by: Uuid,
    audit: &AuditInput,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_entries (business_id, entity_kind, entity_id, action, changes, performed_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(business_id)
    .bind(&audit.entity_kind)
    .bind(audit.entity_id)
    .bind(audit.action.as_str())
    .bind(&audit.changes)
    .bind(performed_by)
    .execute(conn)
    .await?;

    Ok(())
}

/// Stored audit entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditEntryRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub action: String,
    pub changes: serde_json::Value,
    pub performed_by: Uuid,
    pub performed_at: DateTime<Utc>,
}

/// Read access over the audit trail
#[derive(Clone)]
pub struct AuditService {
    db: PgPool,
}

impl AuditService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// History for one entity, newest first
    pub async fn list_for_entity(
        &self,
        business_id: Uuid,
        entity_kind: &str,
        entity_id: Uuid,
    ) -> AppResult<Vec<AuditEntryRow>> {
        let entries = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, business_id, entity_kind, entity_id, action, changes, performed_by, performed_at
            FROM audit_entries
            WHERE business_id = $1 AND entity_kind = $2 AND entity_id = $3
            ORDER BY performed_at DESC
            "#,
        )
        .bind(business_id)
        .bind(entity_kind)
        .bind(entity_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Most recent audit entries for a business
    pub async fn list_recent(&self, business_id: Uuid, limit: i64) -> AppResult<Vec<AuditEntryRow>> {
        let entries = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, business_id, entity_kind, entity_id, action, changes, performed_by, performed_at
            FROM audit_entries
            WHERE business_id = $1
            ORDER BY performed_at DESC
            LIMIT $2
            "#,
        )
        .bind(business_id)
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}
