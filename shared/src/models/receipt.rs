//! Canonical receipt model

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::PaymentType;

/// Which table a receipt was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptSource {
    Yearly,
    Other,
}

/// Source-agnostic view of a payment, ready for document assembly.
///
/// Invariants (upheld by the resolver):
/// - `received_amount` is non-negative with at most two decimal places;
/// - cheque fields are `None` unless `payment_type` is Cheque;
/// - `bank_name` is always `None` for [`ReceiptSource::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReceipt {
    pub receipt_number: String,
    pub receipt_date: NaiveDateTime,
    pub received_amount: Decimal,
    pub payment_type: PaymentType,
    pub cheque_number: Option<String>,
    pub cheque_receive_on: Option<NaiveDate>,
    pub bank_name: Option<String>,
    pub payment_purpose: String,
    pub source: ReceiptSource,
    pub membership_id: i64,
}
