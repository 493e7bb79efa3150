//! Data models
//!
//! Shared between the server and the admin frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod member;
pub mod payment;
pub mod receipt;
pub mod user;

// Re-exports
pub use member::*;
pub use payment::*;
pub use receipt::*;
pub use user::*;
