//! Admin user Model

use serde::{Deserialize, Serialize};

/// Role allowed to manage users and other accounts' passwords
pub const ADMIN_ROLE: &str = "Admin";

/// Admin user row (includes the password hash, never serialized to clients)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub role: String,
    pub status: String,
    /// Mail provider of the sender account (Google | Microsoft)
    pub email_type: Option<String>,
    /// Address receipts are sent from on behalf of this user
    pub sender_email: Option<String>,
    pub created_at: i64,
}

impl User {
    /// Status comparison ignores case and surrounding whitespace
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("active")
    }
}

/// User response (without password)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub email_type: Option<String>,
    pub sender_email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            email_type: user.email_type,
            sender_email: user.sender_email,
        }
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub email_type: Option<String>,
    pub sender_email: Option<String>,
}

/// Admin update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub email_type: Option<String>,
    pub sender_email: Option<String>,
}

/// Normalize a role name: first letter upper case, the rest lower case
pub fn normalize_role(role: &str) -> String {
    let role = role.trim();
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
