//! Database access layer

pub mod payments;
pub mod users;
