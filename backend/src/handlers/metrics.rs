//! HTTP handlers for period metrics

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Permission, PeriodType};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::metrics::{PeriodMetricRow, PeriodSnapshot, UpsertMetricInput};
use crate::services::MetricsService;
use crate::AppState;

/// Upsert one metric value
pub async fn upsert_metric(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpsertMetricInput>,
) -> AppResult<Json<PeriodMetricRow>> {
    current_user.0.require(Permission::MetricsWrite)?;
    let service = MetricsService::new(state.db, state.cache.clone());
    let metric = service
        .upsert_metric(current_user.0.business_id, input)
        .await?;
    Ok(Json(metric))
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period_type: Option<String>,
    pub period: Option<NaiveDate>,
}

/// All metric values for one period
pub async fn get_metrics_for_period(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<HashMap<String, Decimal>>> {
    current_user.0.require(Permission::MetricsRead)?;

    let period_type = parse_period_type(query.period_type.as_deref())?;
    let period = query
        .period
        .ok_or_else(|| AppError::missing("period", "Period date is required"))?;

    let service = MetricsService::new(state.db, state.cache.clone());
    let values = service
        .get_metrics_for_period(current_user.0.business_id, period_type, period)
        .await?;
    Ok(Json(values))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Comma-separated metric names
    pub names: Option<String>,
    pub period_type: Option<String>,
}

/// History of the named metrics grouped by period, newest first
pub async fn get_metric_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<PeriodSnapshot>>> {
    current_user.0.require(Permission::MetricsRead)?;

    let names = parse_names(query.names.as_deref())?;
    let period_type = parse_period_type(query.period_type.as_deref())?;

    let service = MetricsService::new(state.db, state.cache.clone());
    let history = service
        .get_history(current_user.0.business_id, &names, period_type)
        .await?;
    Ok(Json(history))
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    /// Comma-separated metric names
    pub names: Option<String>,
}

/// Most recent value per named metric
pub async fn get_latest_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LatestQuery>,
) -> AppResult<Json<HashMap<String, Decimal>>> {
    current_user.0.require(Permission::MetricsRead)?;

    let names = parse_names(query.names.as_deref())?;
    let service = MetricsService::new(state.db, state.cache.clone());
    let latest = service
        .get_latest(current_user.0.business_id, &names)
        .await?;
    Ok(Json(latest))
}

fn parse_period_type(raw: Option<&str>) -> AppResult<PeriodType> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::missing("period_type", "Period type is required"))?;
    PeriodType::from_str(raw.trim()).map_err(AppError::ValidationError)
}

fn parse_names(raw: Option<&str>) -> AppResult<Vec<String>> {
    let names: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if names.is_empty() {
        return Err(AppError::missing(
            "names",
            "At least one metric name is required",
        ));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_splits_and_trims() {
        let names = parse_names(Some("grossRevenue, grossProfit ,")).unwrap();
        assert_eq!(names, vec!["grossRevenue", "grossProfit"]);
    }

    #[test]
    fn test_parse_names_empty_is_missing_input() {
        assert!(parse_names(None).is_err());
        assert!(parse_names(Some("  ,")).is_err());
    }

    #[test]
    fn test_parse_period_type() {
        assert_eq!(
            parse_period_type(Some("monthly")).unwrap(),
            PeriodType::Monthly
        );
        assert!(parse_period_type(Some("hourly")).is_err());
        assert!(parse_period_type(None).is_err());
    }
}
