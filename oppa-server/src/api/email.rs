//! Receipt email endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::util::non_blank;

use crate::db;
use crate::error::ServiceResult;
use crate::receipt::ReceiptService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/email/receipt", post(send_receipt))
        .route("/api/email/member/{receipt_no}", get(member_email))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceiptRequest {
    pub receipt_number: Option<String>,
    pub user_id: Option<i64>,
    pub to_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceiptResponse {
    pub success: bool,
    pub message: String,
    pub to: String,
}

/// POST /api/email/receipt
pub async fn send_receipt(
    State(state): State<AppState>,
    Json(req): Json<SendReceiptRequest>,
) -> ServiceResult<Json<SendReceiptResponse>> {
    let receipt_number = non_blank(req.receipt_number.as_deref())
        .ok_or_else(|| AppError::required("receiptNumber"))?;
    let user_id = req.user_id.ok_or_else(|| AppError::required("userId"))?;

    let sender = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SenderNotFound))?;
    let from = non_blank(sender.sender_email.as_deref())
        .unwrap_or_else(|| state.ses_from_email.clone());

    let service = ReceiptService::new(&state.pool, &state.renderer, &state.receipts);
    let sent = service
        .email_receipt(&state.mailer, &from, &receipt_number, req.to_email.as_deref())
        .await?;

    Ok(Json(SendReceiptResponse {
        success: true,
        message: "Email sent with PDF".to_string(),
        to: sent.to,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEmailResponse {
    pub email: Option<String>,
}

/// GET /api/email/member/{receipt_no}
pub async fn member_email(
    State(state): State<AppState>,
    Path(receipt_no): Path<String>,
) -> ServiceResult<Json<MemberEmailResponse>> {
    let service = ReceiptService::new(&state.pool, &state.renderer, &state.receipts);
    let email = service.member_email(&receipt_no).await?;
    Ok(Json(MemberEmailResponse { email }))
}
