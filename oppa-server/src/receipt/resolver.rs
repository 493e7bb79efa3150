//! Receipt lookup across the yearly summary and other-payments tables
//!
//! The yearly summary table is consulted first. Only when it has no row for
//! the receipt number are other payments searched, restricted to the
//! receipt-bearing categories. Both row shapes are normalized into one
//! [`CanonicalReceipt`].

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use shared::models::{
    CanonicalReceipt, Member, OtherPaymentRecord, PaymentType, RECEIPT_CATEGORIES,
    RawPaymentRecord, ReceiptSource, YearlySummaryRecord,
};
use thiserror::Error;

use super::words::Amount;

/// Purpose printed for every yearly summary receipt
pub const ANNUAL_PAYMENT: &str = "Annual Payment";
/// Purpose used when an other-payment row has a blank category
pub const DEFAULT_PURPOSE: &str = "Payment";

/// Data store failure, reported opaquely
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Payment lookups by receipt number
///
/// Implementations return every matching row in a stable order; the
/// resolver decides which one wins.
#[allow(async_fn_in_trait)]
pub trait PaymentStore {
    async fn find_yearly(&self, receipt_number: &str) -> StoreResult<Vec<YearlySummaryRecord>>;

    /// Rows whose category is one of `categories`
    async fn find_other(
        &self,
        receipt_number: &str,
        categories: &[&str],
    ) -> StoreResult<Vec<OtherPaymentRecord>>;
}

/// Member lookup by membership id
#[allow(async_fn_in_trait)]
pub trait MemberStore {
    async fn find_member(&self, membership_id: i64) -> StoreResult<Option<Member>>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Missing receipt number")]
    MissingInput,

    #[error("Receipt not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Look up the raw record for a receipt number
///
/// Performs at most two sequential queries. When a source holds more than
/// one row for the number, the first row is used and the duplicate is
/// logged.
pub async fn find_record<S: PaymentStore>(
    store: &S,
    receipt_number: &str,
) -> Result<RawPaymentRecord, ResolveError> {
    let receipt_number = receipt_number.trim();
    if receipt_number.is_empty() {
        return Err(ResolveError::MissingInput);
    }

    let yearly = store.find_yearly(receipt_number).await?;
    if let Some(record) = first_row(yearly, receipt_number, "yearly_payment_summary") {
        return Ok(RawPaymentRecord::YearlySummary(record));
    }

    let other = store.find_other(receipt_number, RECEIPT_CATEGORIES).await?;
    if let Some(record) = first_row(other, receipt_number, "other_payments") {
        return Ok(RawPaymentRecord::OtherPayment(record));
    }

    Err(ResolveError::NotFound(receipt_number.to_string()))
}

/// Resolve a receipt number into its canonical view
pub async fn resolve_receipt<S: PaymentStore>(
    store: &S,
    receipt_number: &str,
) -> Result<CanonicalReceipt, ResolveError> {
    let record = find_record(store, receipt_number).await?;
    Ok(canonicalize(record))
}

fn first_row<T>(rows: Vec<T>, receipt_number: &str, source: &'static str) -> Option<T> {
    if rows.len() > 1 {
        tracing::warn!(
            receipt_number = receipt_number,
            source = source,
            rows = rows.len(),
            "Duplicate receipt number, using first row"
        );
    }
    rows.into_iter().next()
}

/// Normalize a source-specific row
pub fn canonicalize(record: RawPaymentRecord) -> CanonicalReceipt {
    match record {
        RawPaymentRecord::YearlySummary(r) => {
            let payment_type = PaymentType::from_db(r.payment_type.as_deref());
            let (cheque_number, cheque_receive_on) =
                cheque_fields(&payment_type, r.cheque_number, r.cheque_receive_on);
            CanonicalReceipt {
                received_amount: normalize_amount(r.amount_paid, &r.receipt_number),
                receipt_date: r.receipt_date.and_time(NaiveTime::MIN),
                payment_type,
                cheque_number,
                cheque_receive_on,
                bank_name: shared::util::non_blank(r.bank_name.as_deref()),
                payment_purpose: ANNUAL_PAYMENT.to_string(),
                source: ReceiptSource::Yearly,
                membership_id: r.membership_id,
                receipt_number: r.receipt_number,
            }
        }
        RawPaymentRecord::OtherPayment(r) => {
            let payment_type = PaymentType::from_db(r.payment_mode.as_deref());
            let (cheque_number, cheque_receive_on) =
                cheque_fields(&payment_type, r.cheque_number, r.cheque_receive_on);
            let purpose = shared::util::non_blank(Some(r.payment_category.as_str()))
                .unwrap_or_else(|| DEFAULT_PURPOSE.to_string());
            CanonicalReceipt {
                received_amount: normalize_amount(r.amount, &r.receipt_number),
                receipt_date: r.created_at,
                payment_type,
                cheque_number,
                cheque_receive_on,
                bank_name: None,
                payment_purpose: purpose,
                source: ReceiptSource::Other,
                membership_id: r.membership_id,
                receipt_number: r.receipt_number,
            }
        }
    }
}

/// Cheque details only survive on cheque payments
fn cheque_fields(
    payment_type: &PaymentType,
    number: Option<String>,
    receive_on: Option<NaiveDate>,
) -> (Option<String>, Option<NaiveDate>) {
    if payment_type.is_cheque() {
        (shared::util::non_blank(number.as_deref()), receive_on)
    } else {
        (None, None)
    }
}

/// Missing or invalid amounts become 0.00
fn normalize_amount(amount: Option<Decimal>, receipt_number: &str) -> Decimal {
    let Some(value) = amount else {
        tracing::warn!(receipt_number = receipt_number, "Receipt has no amount, using 0.00");
        return Amount::ZERO.value();
    };
    match Amount::new(value) {
        Ok(amount) => amount.value(),
        Err(e) => {
            tracing::warn!(
                receipt_number = receipt_number,
                error = %e,
                "Invalid receipt amount, using 0.00"
            );
            Amount::ZERO.value()
        }
    }
}
