//! HTTP handlers for reporting and rollups

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::Permission;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardSummary, RollupSummary};
use crate::services::ReportingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RollupRequest {
    /// Any date inside the target month; defaults to the current month
    pub date: Option<NaiveDate>,
}

/// Trigger the monthly metric rollup
pub async fn run_monthly_rollup(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RollupRequest>,
) -> AppResult<Json<RollupSummary>> {
    current_user.0.require(Permission::MetricsWrite)?;
    let date = input.date.unwrap_or_else(|| Utc::now().date_naive());
    let service = ReportingService::new(state.db, state.cache.clone());
    let summary = service
        .compute_monthly_rollup(current_user.0.business_id, date)
        .await?;
    Ok(Json(summary))
}

/// Dashboard summary for the business
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    current_user.0.require(Permission::MetricsRead)?;
    let service = ReportingService::new(state.db, state.cache.clone());
    let summary = service
        .get_dashboard_summary(current_user.0.business_id)
        .await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct CsvRangeQuery {
    pub from: Option<chrono::DateTime<Utc>>,
    pub to: Option<chrono::DateTime<Utc>>,
}

/// Export transactions in a time range as CSV
pub async fn export_transactions_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<CsvRangeQuery>,
) -> Result<Response, AppError> {
    current_user.0.require(Permission::LedgerRead)?;

    let from = query
        .from
        .ok_or_else(|| AppError::missing("from", "Range start is required"))?;
    let to = query
        .to
        .ok_or_else(|| AppError::missing("to", "Range end is required"))?;

    let service = ReportingService::new(state.db, state.cache.clone());
    let csv_data = service
        .export_transactions_csv(current_user.0.business_id, from, to)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv_data,
    )
        .into_response())
}
