//! PDF endpoints: single receipt and yearly summary

use axum::{
    Router,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use serde::Deserialize;

use super::pdf_response;
use crate::db;
use crate::error::ServiceResult;
use crate::receipt::ReceiptService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/report/receipt", get(receipt_pdf))
        .route("/api/report/yearly-summary", get(yearly_summary_pdf))
}

#[derive(Deserialize)]
pub struct ReceiptQuery {
    #[serde(rename = "receiptNo")]
    pub receipt_no: Option<String>,
}

/// GET /api/report/receipt?receiptNo=
pub async fn receipt_pdf(
    State(state): State<AppState>,
    Query(query): Query<ReceiptQuery>,
) -> ServiceResult<Response> {
    let service = ReceiptService::new(&state.pool, &state.renderer, &state.receipts);
    let pdf = service
        .render_receipt(query.receipt_no.as_deref().unwrap_or_default())
        .await?;
    let filename = pdf.inline_filename();
    Ok(pdf_response(pdf.bytes, &filename))
}

/// GET /api/report/yearly-summary
pub async fn yearly_summary_pdf(State(state): State<AppState>) -> ServiceResult<Response> {
    let rows = db::payments::yearly_summary_report(&state.pool).await?;
    let doc = state.reports.build(&rows);
    let bytes = state.renderer.render(&doc)?;
    tracing::info!(rows = rows.len(), size = bytes.len(), "Yearly summary rendered");
    Ok(pdf_response(bytes, "Yearly_Payment_Summary.pdf"))
}
