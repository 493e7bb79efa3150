//! Admin authentication and login rate limiting

pub mod admin_auth;
pub mod rate_limit;

pub use admin_auth::AdminIdentity;
