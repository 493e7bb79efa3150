//! Shared types for the OPPA receipts backend
//!
//! Error system, domain models (members, payment records, canonical
//! receipts, admin users) and small helpers used by every crate.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
