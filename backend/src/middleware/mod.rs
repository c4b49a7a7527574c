//! Middleware for the Operations Platform

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
