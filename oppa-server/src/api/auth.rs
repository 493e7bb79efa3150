//! Login and password change

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    routing::post,
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ApiResponse, ErrorCode};

use crate::auth::AdminIdentity;
use crate::auth::admin_auth::create_token;
use crate::auth::rate_limit::login_rate_limit;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::{hash_password, validate_password, verify_password};

use super::ApiResult;

/// Public login route, rate limited per client IP
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/api/auth/change-password", post(change_password))
}

/// POST /api/auth/login
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub user_id: i64,
    pub name: String,
    pub role: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    }

    let user = db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(|e| {
            tracing::error!("DB error during login: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    }

    if !user.is_active() {
        tracing::info!(user_id = user.user_id, "Login refused for inactive account");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let token = create_token(user.user_id, &user.email, &user.role, &state.jwt_secret).map_err(
        |e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        },
    )?;

    tracing::info!(user_id = user.user_id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            user_id: user.user_id,
            name: user.name,
            role: user.role,
            email: user.email,
        },
    }))
}

/// POST /api/auth/change-password
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub new_password: String,
}

/// Users change their own password; admins may change anyone's
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AdminIdentity>,
    Json(req): Json<ChangePasswordRequest>,
) -> ServiceResult<ApiResponse<()>> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::required("email").into());
    }
    if !caller.may_manage(&email) {
        tracing::warn!(user_id = caller.user_id, account = %email, "Password change refused");
        return Err(AppError::new(ErrorCode::AdminRequired).into());
    }
    validate_password(&req.new_password)?;

    let hashed = hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    if !db::users::update_password(&state.pool, &email, &hashed).await? {
        return Err(AppError::new(ErrorCode::UserNotFound).into());
    }

    tracing::info!(user_id = caller.user_id, email = %email, "Password changed");
    Ok(ApiResponse::ok_with_message("Password updated successfully"))
}
