//! HTTP handlers for stock record reads

use axum::{
    extract::{Path, State},
    Json,
};
use shared::Permission;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::StockRecordRow;
use crate::services::StockService;
use crate::AppState;

/// List all stock records for the business
pub async fn list_stock_records(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockRecordRow>>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = StockService::new(state.db);
    let records = service.list(current_user.0.business_id).await?;
    Ok(Json(records))
}

/// List stock records for one warehouse
pub async fn list_warehouse_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockRecordRow>>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = StockService::new(state.db);
    let records = service
        .list_for_warehouse(current_user.0.business_id, warehouse_id)
        .await?;
    Ok(Json(records))
}

/// Get one stock record by id
pub async fn get_stock_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_record_id): Path<Uuid>,
) -> AppResult<Json<StockRecordRow>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = StockService::new(state.db);
    let record = service
        .get(current_user.0.business_id, stock_record_id)
        .await?;
    Ok(Json(record))
}
