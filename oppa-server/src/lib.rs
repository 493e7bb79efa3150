//! oppa-server: receipts backend for the Okhla Printers & Providers Association
//!
//! - Resolves payment receipts from the yearly summary and other-payments tables
//! - Lays them out as receipt vouchers and renders PDFs
//! - Emails receipts to members through AWS SES
//! - Serves the admin HTTP API (JWT authenticated)

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod receipt;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;
