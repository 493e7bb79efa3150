//! HTTP API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//! | /api/auth/login | POST | none (rate limited) |
//! | /api/auth/change-password | POST | JWT (own account, or admin) |
//! | /api/users | GET, POST | JWT, admin |
//! | /api/users/{id} | PUT | JWT, admin |
//! | /api/users/role | GET | JWT |
//! | /api/payments/other | GET | JWT |
//! | /api/report/receipt | GET | JWT |
//! | /api/report/yearly-summary | GET | JWT |
//! | /api/email/receipt | POST | JWT |
//! | /api/email/member/{receipt_no} | GET | JWT |

pub mod auth;
pub mod email;
pub mod health;
pub mod payments;
pub mod report;
pub mod users;

use axum::body::Body;
use axum::http::{HeaderValue, Request, Response, header};
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::admin_auth::admin_auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

async fn log_request(request: Request<Body>, next: middleware::Next) -> Response<Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Inline PDF response
pub fn pdf_response(bytes: Vec<u8>, filename: &str) -> Response<Body> {
    let disposition = format!("inline; filename={}", filename.replace(['"', '\r', '\n'], ""));
    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// All routes, without the outer middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::protected_router())
        .merge(users::router())
        .merge(payments::router())
        .merge(report::router())
        .merge(email::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(protected)
}

/// Create the application with middleware and state
pub fn create_router(state: AppState) -> Router {
    build_router(&state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_response_headers() {
        let response = pdf_response(b"%PDF-1.4".to_vec(), "Receipt_RC-2024-001.pdf");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=Receipt_RC-2024-001.pdf"
        );
    }
}
