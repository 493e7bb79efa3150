//! Admin JWT authentication

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{ADMIN_ROLE, User};

use crate::receipt::StoreError;
use crate::state::AppState;

/// JWT claims for an admin user
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated caller, taken from the current account row rather than the
/// token claims so role and email changes apply immediately
#[derive(Debug, Clone, PartialEq)]
pub struct AdminIdentity {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

impl AdminIdentity {
    pub fn is_admin(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Admins may act on any account, everyone else only on their own
    pub fn may_manage(&self, email: &str) -> bool {
        self.is_admin() || self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// Account lookup used on every authenticated request
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn find_account(&self, user_id: i64) -> Result<Option<User>, StoreError>;
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a user
pub fn create_token(
    user_id: i64,
    email: &str,
    role: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AdminClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a token
pub fn verify_token(token: &str, secret: &str) -> Result<AdminIdentity, AppError> {
    let token_data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::new(ErrorCode::TokenInvalid)
    })?;

    let claims = token_data.claims;
    let user_id = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed subject"))?;

    Ok(AdminIdentity {
        user_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Middleware that extracts and verifies the JWT from the Authorization header
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format").into_response())?;

    let claimed = verify_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;
    let account = state
        .accounts
        .find_account(claimed.user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = claimed.user_id, error = %e, "Account lookup failed");
            AppError::new(ErrorCode::InternalError).into_response()
        })?;
    let identity =
        current_identity(claimed.user_id, account).map_err(IntoResponse::into_response)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Check the account behind a valid token is still allowed in
fn current_identity(user_id: i64, account: Option<User>) -> Result<AdminIdentity, AppError> {
    let Some(user) = account else {
        tracing::info!(user_id, "Token for a deleted account");
        return Err(AppError::invalid_token("Account no longer exists"));
    };
    if !user.is_active() {
        tracing::info!(user_id, "Request refused for inactive account");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(AdminIdentity {
        user_id: user.user_id,
        email: user.email,
        role: user.role,
    })
}

/// Route layer for admin-only routes; runs inside [`admin_auth_middleware`]
pub async fn require_admin(request: Request, next: Next) -> Result<Response, Response> {
    match request.extensions().get::<AdminIdentity>() {
        Some(identity) if identity.is_admin() => Ok(next.run(request).await),
        Some(identity) => {
            tracing::warn!(
                user_id = identity.user_id,
                role = %identity.role,
                "Admin role required"
            );
            Err(AppError::new(ErrorCode::AdminRequired).into_response())
        }
        None => Err(AppError::not_authenticated().into_response()),
    }
}
