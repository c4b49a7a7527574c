//! HTTP handlers for the audit trail

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::Permission;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ledger::LimitQuery;
use crate::middleware::CurrentUser;
use crate::services::audit::AuditEntryRow;
use crate::services::AuditService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EntityPath {
    pub entity_kind: String,
    pub entity_id: Uuid,
}

/// History for one entity, newest first
pub async fn list_entity_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(path): Path<EntityPath>,
) -> AppResult<Json<Vec<AuditEntryRow>>> {
    current_user.0.require(Permission::AuditRead)?;
    let service = AuditService::new(state.db);
    let entries = service
        .list_for_entity(current_user.0.business_id, &path.entity_kind, path.entity_id)
        .await?;
    Ok(Json(entries))
}

/// Most recent audit entries for the business
pub async fn list_recent_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<AuditEntryRow>>> {
    current_user.0.require(Permission::AuditRead)?;
    let service = AuditService::new(state.db);
    let entries = service
        .list_recent(current_user.0.business_id, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(entries))
}
