//! HTTP handlers for the transaction ledger

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Page, PageParams, Permission};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::ledger::{RecordTransactionInput, TransactionRow, TransactionWithNames};
use crate::services::LedgerService;
use crate::AppState;

/// Record a ledger transaction
pub async fn record_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordTransactionInput>,
) -> AppResult<Json<TransactionRow>> {
    current_user.0.require(Permission::LedgerWrite)?;
    let service = LedgerService::new(state.db, state.cache.clone());
    let transaction = service
        .record_transaction(current_user.0.business_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(transaction))
}

/// Paginated transaction listing
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<TransactionWithNames>>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = LedgerService::new(state.db, state.cache.clone());
    let page = service
        .list_paginated(current_user.0.business_id, params)
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Most recent transactions with display names
pub async fn list_recent_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<TransactionWithNames>>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = LedgerService::new(state.db, state.cache.clone());
    let transactions = service
        .list_recent(current_user.0.business_id, query.limit)
        .await?;
    Ok(Json(transactions))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// When true, rows are joined with related display fields
    pub detailed: Option<bool>,
}

/// Transactions in an inclusive creation-time range
pub async fn list_transactions_by_range(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> Result<Response, AppError> {
    current_user.0.require(Permission::LedgerRead)?;

    let from = query
        .from
        .ok_or_else(|| AppError::missing("from", "Range start is required"))?;
    let to = query
        .to
        .ok_or_else(|| AppError::missing("to", "Range end is required"))?;

    let service = LedgerService::new(state.db, state.cache.clone());
    let business_id = current_user.0.business_id;

    if query.detailed.unwrap_or(false) {
        let transactions = service
            .list_by_time_range_with_names(business_id, from, to)
            .await?;
        Ok(Json(transactions).into_response())
    } else {
        let transactions = service.list_by_time_range(business_id, from, to).await?;
        Ok(Json(transactions).into_response())
    }
}

#[derive(Debug, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// Transactions filtered by type
pub async fn list_transactions_by_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TypeQuery>,
) -> AppResult<Json<Vec<TransactionRow>>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = LedgerService::new(state.db, state.cache.clone());
    let transactions = service
        .list_by_type(
            current_user.0.business_id,
            query.transaction_type.as_deref(),
        )
        .await?;
    Ok(Json(transactions))
}

/// Get one transaction by id
pub async fn get_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionRow>> {
    current_user.0.require(Permission::LedgerRead)?;
    let service = LedgerService::new(state.db, state.cache.clone());
    let transaction = service
        .get_by_id(current_user.0.business_id, transaction_id)
        .await?;
    Ok(Json(transaction))
}
