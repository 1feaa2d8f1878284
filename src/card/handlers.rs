//! Card HTTP endpoints and their authorization policy
//!
//! Policy (enforced here, not in the engine):
//! - ADMIN: list/search all cards, create, delete, any status change.
//! - Owner: view own cards and balances, self-block own card, transfer
//!   between two cards they own.
//! - Everything else is denied.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use validator::Validate;

use super::models::{BalanceDto, CardDto, CardStatus, CreateCardRequest, TransferRequest};
use super::service::CardService;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, Page, PageParams};

/// Query parameters for the card listing endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCardsParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    /// Owner username filter (admin: substring search; user: own name only)
    pub owner: Option<String>,
}

fn default_size() -> i64 {
    10
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusParams {
    /// Target status, `ACTIVE` or `BLOCKED` (`EXPIRED` is never assignable)
    pub status: String,
}

/// Listing scope resolved from the caller's identity and the owner filter
#[derive(Debug, PartialEq)]
enum ListScope {
    /// Every card (admin without a filter)
    All,
    /// The caller's own cards, exact username match
    Own,
    /// Case-insensitive substring search on the owner name (admin only)
    Search(String),
}

/// Usernames are case-sensitive. A non-admin may only filter by their own
/// exact name, and that filter runs the exact-match query: routing it
/// through the substring search would return cards of every user whose
/// name contains the caller's.
fn resolve_list_scope(user: &AuthUser, owner: Option<String>) -> Result<ListScope, ApiError> {
    match owner {
        None if user.is_admin() => Ok(ListScope::All),
        None => Ok(ListScope::Own),
        Some(owner) if user.is_admin() => Ok(ListScope::Search(owner)),
        Some(owner) if owner == user.username => Ok(ListScope::Own),
        Some(_) => Err(ApiError::Forbidden("Access denied".to_string())),
    }
}

/// Admin sees any card; everyone else only their own.
async fn require_admin_or_owner(
    state: &AppState,
    user: &AuthUser,
    card_id: i64,
) -> Result<(), ApiError> {
    if user.is_admin() || CardService::is_owner(&state.db, card_id, &user.username).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Access denied".to_string()))
    }
}

/// List cards
///
/// GET /api/v1/cards
#[utoipa::path(
    get,
    path = "/api/v1/cards",
    params(ListCardsParams),
    responses(
        (status = 200, description = "Page of cards", body = ApiResponse<Page<CardDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Owner filter does not match caller")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListCardsParams>,
) -> Result<Json<ApiResponse<Page<CardDto>>>, ApiError> {
    let page = PageParams {
        page: params.page,
        size: params.size,
    };

    let result = match resolve_list_scope(&user, params.owner)? {
        ListScope::All => CardService::list_all(&state.db, page).await?,
        ListScope::Own => {
            CardService::list_by_owner(&state.db, &user.username, false, page).await?
        }
        ListScope::Search(owner) => {
            CardService::list_by_owner(&state.db, &owner, true, page).await?
        }
    };

    Ok(Json(ApiResponse::success(result)))
}

/// Get card by ID
///
/// GET /api/v1/cards/{id}
#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}",
    params(("id" = i64, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card data", body = ApiResponse<CardDto>),
        (status = 403, description = "Not the card owner"),
        (status = 404, description = "Card not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CardDto>>, ApiError> {
    require_admin_or_owner(&state, &user, id).await?;
    let card = CardService::get_card(&state.db, id).await?;
    Ok(Json(ApiResponse::success(card)))
}

/// Get card balance
///
/// GET /api/v1/cards/{id}/balance
#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}/balance",
    params(("id" = i64, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card balance", body = ApiResponse<BalanceDto>),
        (status = 403, description = "Not the card owner"),
        (status = 404, description = "Card not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<BalanceDto>>, ApiError> {
    require_admin_or_owner(&state, &user, id).await?;
    let balance = CardService::get_balance(&state.db, id).await?;
    Ok(Json(ApiResponse::success(BalanceDto { id, balance })))
}

/// Create a new card (admin)
///
/// POST /api/v1/cards
#[utoipa::path(
    post,
    path = "/api/v1/cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card created", body = ApiResponse<CardDto>),
        (status = 400, description = "Invalid card data"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Owner not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn create_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CardDto>>), ApiError> {
    user.require_role(crate::auth::ROLE_ADMIN)?;
    req.validate()
        .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
    let card = CardService::create_card(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(card))))
}

/// Update card status
///
/// PUT /api/v1/cards/{id}/status
///
/// Admin may set any assignable status; an owner may only block their own
/// card. EXPIRED is derived from the expiry date and rejected here.
#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}/status",
    params(("id" = i64, Path, description = "Card ID"), StatusParams),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<CardDto>),
        (status = 400, description = "Disallowed status value"),
        (status = 403, description = "Not permitted for this caller"),
        (status = 404, description = "Card not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Query(params): Query<StatusParams>,
) -> Result<Json<ApiResponse<CardDto>>, ApiError> {
    let status = CardStatus::parse(&params.status)?;

    let allowed = user.is_admin()
        || (status == CardStatus::Blocked
            && CardService::is_owner(&state.db, id, &user.username).await?);
    if !allowed {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let card = CardService::update_status(&state.db, id, status).await?;
    Ok(Json(ApiResponse::success(card)))
}

/// Delete a card (admin)
///
/// DELETE /api/v1/cards/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/cards/{id}",
    params(("id" = i64, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Card not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    user.require_role(crate::auth::ROLE_ADMIN)?;
    CardService::delete_card(&state.db, id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Transfer between two cards of the caller
///
/// POST /api/v1/cards/transfer
///
/// The caller must own both cards; a valid token alone grants nothing.
#[utoipa::path(
    post,
    path = "/api/v1/cards/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer completed"),
        (status = 400, description = "Business rule violation"),
        (status = 403, description = "Caller does not own both cards")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let owns_from = CardService::is_owner(&state.db, req.from_card_id, &user.username).await?;
    let owns_to = CardService::is_owner(&state.db, req.to_card_id, &user.username).await?;
    if !owns_from || !owns_to {
        return Err(ApiError::Forbidden(
            "Transfers are only allowed between your own cards".to_string(),
        ));
    }

    CardService::transfer(&state.db, req).await?;
    Ok(Json(ApiResponse::success(())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, roles: &[&str]) -> AuthUser {
        AuthUser {
            username: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_admin_list_scopes() {
        let admin = user("root", &["USER", "ADMIN"]);
        assert_eq!(resolve_list_scope(&admin, None).unwrap(), ListScope::All);
        assert_eq!(
            resolve_list_scope(&admin, Some("ali".to_string())).unwrap(),
            ListScope::Search("ali".to_string())
        );
    }

    #[test]
    fn test_own_name_filter_uses_exact_match() {
        // "alice" filtering by "alice" must not reach the substring search;
        // that query would also return cards of "malice" and "alice2".
        let alice = user("alice", &["USER"]);
        assert_eq!(resolve_list_scope(&alice, None).unwrap(), ListScope::Own);
        assert_eq!(
            resolve_list_scope(&alice, Some("alice".to_string())).unwrap(),
            ListScope::Own
        );
    }

    #[test]
    fn test_foreign_owner_filter_denied() {
        let alice = user("alice", &["USER"]);
        for filter in ["bob", "malice", "ali", "Alice", "ALICE"] {
            assert!(
                matches!(
                    resolve_list_scope(&alice, Some(filter.to_string())),
                    Err(ApiError::Forbidden(_))
                ),
                "filter {:?} must be denied for a plain user",
                filter
            );
        }
    }
}
