//! Other-payment listing

use axum::{Json, Router, extract::State, routing::get};
use shared::models::OtherPaymentRecord;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/payments/other", get(list_other_payments))
}

/// GET /api/payments/other
///
/// Lists the whole ledger; receipt lookup alone is limited to the
/// receipt-bearing categories.
pub async fn list_other_payments(
    State(state): State<AppState>,
) -> ServiceResult<Json<Vec<OtherPaymentRecord>>> {
    let rows = db::payments::list_other(&state.pool).await?;
    Ok(Json(rows))
}
