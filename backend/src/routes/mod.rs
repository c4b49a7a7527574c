//! Route definitions for the Operations Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - transaction ledger
        .nest("/ledger", ledger_routes())
        // Protected routes - period metrics
        .nest("/metrics", metrics_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Transaction ledger routes (protected)
fn ledger_routes() -> Router<AppState> {
    Router::new()
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::record_transaction),
        )
        .route(
            "/transactions/recent",
            get(handlers::list_recent_transactions),
        )
        .route(
            "/transactions/range",
            get(handlers::list_transactions_by_range),
        )
        .route(
            "/transactions/by-type",
            get(handlers::list_transactions_by_type),
        )
        .route("/transactions/:transaction_id", get(handlers::get_transaction))
        // Stock records
        .route("/stock-records", get(handlers::list_stock_records))
        .route(
            "/stock-records/:stock_record_id",
            get(handlers::get_stock_record),
        )
        .route(
            "/warehouses/:warehouse_id/stock-records",
            get(handlers::list_warehouse_stock),
        )
        // Audit trail
        .route("/audit", get(handlers::list_recent_audit))
        .route(
            "/audit/:entity_kind/:entity_id",
            get(handlers::list_entity_audit),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Period metric routes (protected)
fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/", put(handlers::upsert_metric))
        .route("/period", get(handlers::get_metrics_for_period))
        .route("/history", get(handlers::get_metric_history))
        .route("/latest", get(handlers::get_latest_metrics))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/rollup/monthly", post(handlers::run_monthly_rollup))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/transactions.csv", get(handlers::export_transactions_csv))
        .route_layer(middleware::from_fn(auth_middleware))
}
