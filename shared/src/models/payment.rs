//! Payment record models
//!
//! Two source tables hold receipts: the yearly membership fee summary and
//! the "other payments" ledger (registration fees and miscellaneous
//! payments). Their rows have different shapes; [`RawPaymentRecord`] keeps
//! them apart until the resolver normalizes them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of the other-payments ledger that may be printed as receipts
pub const RECEIPT_CATEGORIES: &[&str] = &["Other", "Registration"];

/// How a payment was made
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentType {
    Cash,
    Cheque,
    Online,
    /// Not recorded
    Unspecified,
    /// Any other label stored by the admin screens (UPI, NEFT, ...)
    Other(String),
}

impl PaymentType {
    /// Parse a stored payment type column
    pub fn from_db(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Unspecified,
            Some(v) if v.eq_ignore_ascii_case("cash") => Self::Cash,
            Some(v) if v.eq_ignore_ascii_case("cheque") => Self::Cheque,
            Some(v) if v.eq_ignore_ascii_case("online") => Self::Online,
            Some(v) => Self::Other(v.to_string()),
        }
    }

    pub fn is_cheque(&self) -> bool {
        matches!(self, Self::Cheque)
    }

    /// Label printed on documents
    pub fn label(&self) -> &str {
        match self {
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
            Self::Online => "Online",
            Self::Unspecified => "-",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for PaymentType {
    fn from(value: String) -> Self {
        Self::from_db(Some(&value))
    }
}

impl From<PaymentType> for String {
    fn from(value: PaymentType) -> Self {
        value.label().to_string()
    }
}

/// Row of the yearly payment summary (annual membership fee)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct YearlySummaryRecord {
    pub receipt_number: String,
    pub receipt_date: NaiveDate,
    pub amount_paid: Option<Decimal>,
    pub cheque_number: Option<String>,
    pub cheque_receive_on: Option<NaiveDate>,
    pub payment_type: Option<String>,
    pub bank_name: Option<String>,
    pub payment_year: Option<i32>,
    pub membership_id: i64,
}

/// Row of the other-payments ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OtherPaymentRecord {
    pub payment_id: i64,
    pub receipt_number: String,
    /// Creation timestamp, doubles as the receipt date
    pub created_at: NaiveDateTime,
    pub amount: Option<Decimal>,
    pub cheque_number: Option<String>,
    pub cheque_receive_on: Option<NaiveDate>,
    pub payment_mode: Option<String>,
    pub payment_category: String,
    pub remarks: Option<String>,
    pub membership_id: i64,
}

/// A payment row as found in one of the two source tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RawPaymentRecord {
    YearlySummary(YearlySummaryRecord),
    OtherPayment(OtherPaymentRecord),
}

/// One line of the yearly payment summary report (summary joined with member)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct YearlySummaryReportRow {
    pub receipt_number: Option<String>,
    pub receipt_date: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub member_name: Option<String>,
    pub received_amount: Option<Decimal>,
    pub cheque_number: Option<String>,
    pub payment_year: Option<i32>,
    pub payment_type: Option<String>,
}
