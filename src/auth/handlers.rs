use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::gateway::{state::AppState, types::ApiResponse};

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<i64>),
        (status = 400, description = "Invalid input or username already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<i64>>), ApiError> {
    let user_id = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user_id))))
}

/// Login user
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let username = req.username.clone();
    match state.auth.login(req).await {
        Ok(resp) => Ok(Json(ApiResponse::success(resp))),
        Err(e) => {
            tracing::warn!(username = %username, "login failed");
            Err(e)
        }
    }
}
