//! Member Model

use serde::{Deserialize, Serialize};

/// Association member (owned by the membership register)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub membership_id: i64,
    pub member_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
}

impl Member {
    /// Name printed after "M/s": the company when there is one, else the member
    pub fn display_name(&self) -> &str {
        match self.company_name.as_deref().map(str::trim) {
            Some(company) if !company.is_empty() => company,
            _ => self.member_name.trim(),
        }
    }

    /// Email address on file, if any
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}
