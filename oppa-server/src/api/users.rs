//! Admin user management

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{UserCreate, UserResponse, UserUpdate, normalize_role};
use shared::util::non_blank;

use crate::auth::admin_auth::require_admin;
use crate::db::users::{self, NewUser, UserChanges};
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::util::{hash_password, validate_email, validate_password};

const DEFAULT_ROLE: &str = "User";

/// Role lookup is open to any signed-in user; account management is admin only
pub fn router() -> Router<AppState> {
    let admin_only = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/users/role", get(get_role))
        .merge(admin_only)
}

fn role_or_default(role: &str) -> String {
    let role = normalize_role(role);
    if role.is_empty() {
        DEFAULT_ROLE.to_string()
    } else {
        role
    }
}

/// Unique violations on `users.email` become `UserEmailExists`
fn email_conflict(err: sqlx::Error) -> ServiceError {
    if err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        AppError::new(ErrorCode::UserEmailExists).into()
    } else {
        err.into()
    }
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> ServiceResult<Json<UserResponse>> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::required("name").into());
    }
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(&req.password)?;

    if users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::UserEmailExists).into());
    }

    let hashed = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let role = role_or_default(&req.role);
    let email_type = non_blank(req.email_type.as_deref());
    let sender_email = non_blank(req.sender_email.as_deref());

    let user_id = users::create(
        &state.pool,
        &NewUser {
            name,
            email: &email,
            hashed_password: &hashed,
            role: &role,
            email_type: email_type.as_deref(),
            sender_email: sender_email.as_deref(),
        },
        shared::util::now_millis(),
    )
    .await
    .map_err(email_conflict)?;

    tracing::info!(user_id, role = %role, "User created");

    let user = users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(user.into()))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ServiceResult<Json<Vec<UserResponse>>> {
    let users = users::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<UserUpdate>,
) -> ServiceResult<Json<UserResponse>> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::required("name").into());
    }
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;
    let role = role_or_default(&req.role);
    let status = req.status.trim().to_lowercase();
    if status.is_empty() {
        return Err(AppError::required("status").into());
    }
    let email_type = non_blank(req.email_type.as_deref());
    let sender_email = non_blank(req.sender_email.as_deref());

    let changes = UserChanges {
        name,
        email: &email,
        role: &role,
        status: &status,
        email_type: email_type.as_deref(),
        sender_email: sender_email.as_deref(),
    };
    if !users::update(&state.pool, user_id, &changes)
        .await
        .map_err(email_conflict)?
    {
        return Err(AppError::new(ErrorCode::UserNotFound).into());
    }

    tracing::info!(user_id, status = %status, "User updated");

    let user = users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(user.into()))
}

#[derive(Deserialize)]
pub struct RoleQuery {
    pub email: Option<String>,
}

/// GET /api/users/role?email=
pub async fn get_role(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> ServiceResult<Json<serde_json::Value>> {
    let email = non_blank(query.email.as_deref()).ok_or_else(|| AppError::required("email"))?;
    let user = users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(serde_json::json!({ "role": user.role })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_or_default() {
        assert_eq!(role_or_default("admin"), "Admin");
        assert_eq!(role_or_default("  "), "User");
    }
}
