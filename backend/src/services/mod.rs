//! Business logic services for the Operations Platform

pub mod audit;
pub mod catalog;
pub mod ledger;
pub mod metrics;
pub mod reporting;
pub mod stock;

pub use audit::AuditService;
pub use catalog::CatalogService;
pub use ledger::LedgerService;
pub use metrics::MetricsService;
pub use reporting::ReportingService;
pub use stock::StockService;
