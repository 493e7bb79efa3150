//! Unified service-layer error type
//!
//! `ServiceError` bridges the gap between infrastructure errors (`sqlx::Error`,
//! store, rendering and mail failures) and the API-layer error (`AppError`).
//! It enables `?` propagation in handlers without per-call `map_err` logging.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::receipt::{DeliveryError, ResolveError, StoreError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<oppa_pdf::PdfError> for ServiceError {
    fn from(e: oppa_pdf::PdfError) -> Self {
        DeliveryError::Render(e).into()
    }
}

impl From<ResolveError> for ServiceError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::MissingInput => ServiceError::App(AppError::required("receiptNo")),
            ResolveError::NotFound(number) => ServiceError::App(
                AppError::new(ErrorCode::ReceiptNotFound).with_detail("receipt_number", number),
            ),
            ResolveError::Store(err) => err.into(),
        }
    }
}

impl From<DeliveryError> for ServiceError {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::Resolve(err) => err.into(),
            DeliveryError::MemberNotFound(id) => ServiceError::App(
                AppError::new(ErrorCode::MemberNotFound).with_detail("membership_id", id),
            ),
            DeliveryError::MissingRecipient(number) => ServiceError::App(
                AppError::new(ErrorCode::MemberEmailMissing).with_detail("receipt_number", number),
            ),
            DeliveryError::Render(err) => {
                tracing::error!(error = %err, "PDF rendering failed");
                ServiceError::App(AppError::new(ErrorCode::RenderFailed))
            }
            DeliveryError::Mail(err) => {
                tracing::error!(error = %err, "Email delivery failed");
                ServiceError::App(AppError::new(ErrorCode::EmailDeliveryFailed))
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn app(e: impl Into<ServiceError>) -> AppError {
        let service: ServiceError = e.into();
        service.into()
    }

    #[test]
    fn test_resolve_errors_map_to_client_errors() {
        let missing = app(ResolveError::MissingInput);
        assert_eq!(missing.code, ErrorCode::RequiredField);

        let not_found = app(ResolveError::NotFound("RC-404".into()));
        assert_eq!(not_found.code, ErrorCode::ReceiptNotFound);
        assert_eq!(not_found.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_error_is_opaque() {
        let err = app(ResolveError::Store(StoreError::Database(
            "connection refused".into(),
        )));
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(!err.message.contains("connection refused"));
    }

    #[test]
    fn test_delivery_errors() {
        assert_eq!(
            app(DeliveryError::MemberNotFound(7)).code,
            ErrorCode::MemberNotFound
        );
        assert_eq!(
            app(DeliveryError::Mail(crate::email::MailError::Delivery("x".into()))).code,
            ErrorCode::EmailDeliveryFailed
        );
        assert_eq!(
            app(DeliveryError::Render(oppa_pdf::PdfError::InvalidConfig("x".into()))).code,
            ErrorCode::RenderFailed
        );
    }
}
