//! HTTP handlers for the Operations Platform

pub mod audit;
pub mod health;
pub mod ledger;
pub mod metrics;
pub mod reports;
pub mod stock;

pub use audit::*;
pub use health::*;
pub use ledger::*;
pub use metrics::*;
pub use reports::*;
pub use stock::*;
