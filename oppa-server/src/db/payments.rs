//! Payment, member and report queries
//!
//! `PgPool` is the production [`PaymentStore`] and [`MemberStore`].

use shared::models::{Member, OtherPaymentRecord, YearlySummaryRecord, YearlySummaryReportRow};
use sqlx::PgPool;

use crate::receipt::resolver::{MemberStore, PaymentStore, StoreResult};

const YEARLY_COLUMNS: &str = "receipt_number, receipt_date, amount_paid, cheque_number, \
     cheque_receive_on, payment_type, bank_name, payment_year, membership_id";

const OTHER_COLUMNS: &str = "payment_id, receipt_number, created_at, amount, cheque_number, \
     cheque_receive_on, payment_mode, payment_category, remarks, membership_id";

impl PaymentStore for PgPool {
    async fn find_yearly(&self, receipt_number: &str) -> StoreResult<Vec<YearlySummaryRecord>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {YEARLY_COLUMNS} FROM yearly_payment_summary
             WHERE receipt_number = $1 ORDER BY id"
        ))
        .bind(receipt_number)
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn find_other(
        &self,
        receipt_number: &str,
        categories: &[&str],
    ) -> StoreResult<Vec<OtherPaymentRecord>> {
        let categories: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        let rows = sqlx::query_as(&format!(
            "SELECT {OTHER_COLUMNS} FROM other_payments
             WHERE receipt_number = $1 AND payment_category = ANY($2)
             ORDER BY payment_id"
        ))
        .bind(receipt_number)
        .bind(categories)
        .fetch_all(self)
        .await?;
        Ok(rows)
    }
}

impl MemberStore for PgPool {
    async fn find_member(&self, membership_id: i64) -> StoreResult<Option<Member>> {
        let member = sqlx::query_as(
            "SELECT membership_id, member_name, company_name, email
             FROM members WHERE membership_id = $1",
        )
        .bind(membership_id)
        .fetch_optional(self)
        .await?;
        Ok(member)
    }
}

/// Every other-payment row, whatever its category, newest first
pub async fn list_other(pool: &PgPool) -> Result<Vec<OtherPaymentRecord>, sqlx::Error> {
    sqlx::query_as(&list_other_sql()).fetch_all(pool).await
}

fn list_other_sql() -> String {
    format!(
        "SELECT {OTHER_COLUMNS} FROM other_payments
         ORDER BY created_at DESC, payment_id DESC"
    )
}

/// Yearly summary joined with members, newest receipt first
pub async fn yearly_summary_report(
    pool: &PgPool,
) -> Result<Vec<YearlySummaryReportRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT yps.receipt_number,
                yps.receipt_date,
                m.company_name,
                m.member_name,
                yps.amount_paid AS received_amount,
                yps.cheque_number,
                yps.payment_year,
                yps.payment_type
         FROM yearly_payment_summary yps
         LEFT JOIN members m ON m.membership_id = yps.membership_id
         ORDER BY yps.receipt_date DESC, yps.id DESC",
    )
    .fetch_all(pool)
    .await
}
