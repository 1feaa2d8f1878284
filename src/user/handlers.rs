//! User management endpoints (admin role required on every route)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::models::{UpdateUserRequest, UserDto};
use super::service::UserService;
use crate::auth::{AuthUser, ROLE_ADMIN};
use crate::auth::service::RegisterRequest;
use crate::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, Page, PageParams};

/// List users
///
/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageParams),
    responses(
        (status = 200, description = "Page of users", body = ApiResponse<Page<UserDto>>),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<Page<UserDto>>>, ApiError> {
    user.require_role(ROLE_ADMIN)?;
    let page = UserService::list(&state.db, params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Get user by ID
///
/// GET /api/v1/users/{id}
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User data", body = ApiResponse<UserDto>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    user.require_role(ROLE_ADMIN)?;
    let dto = UserService::get(&state.db, id).await?;
    Ok(Json(ApiResponse::success(dto)))
}

/// Create a user
///
/// POST /api/v1/users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid input or username already exists"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    user.require_role(ROLE_ADMIN)?;
    let dto = UserService::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

/// Update a user (password and/or roles)
///
/// PUT /api/v1/users/{id}
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    user.require_role(ROLE_ADMIN)?;
    let dto = UserService::update(&state.db, id, req).await?;
    Ok(Json(ApiResponse::success(dto)))
}

/// Delete a user
///
/// DELETE /api/v1/users/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    user.require_role(ROLE_ADMIN)?;
    UserService::delete(&state.db, id).await?;
    Ok(Json(ApiResponse::success(())))
}
