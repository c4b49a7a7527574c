//! Shared types and models for the Operations Platform
//!
//! This crate contains domain types shared between the backend and other
//! components of the system: the ledger models, pagination helpers, the
//! role capability table, and input validation.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
