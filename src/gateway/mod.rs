//! HTTP gateway: router assembly and server startup

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::middleware::jwt_auth_middleware;
use state::AppState;

/// Build the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public: login + registration
    let auth_routes = Router::new()
        .route("/register", post(crate::auth::handlers::register))
        .route("/login", post(crate::auth::handlers::login));

    // Card management; role/ownership policy lives in the handlers
    let card_routes = Router::new()
        .route("/", get(crate::card::handlers::list_cards))
        .route("/", post(crate::card::handlers::create_card))
        .route("/transfer", post(crate::card::handlers::transfer))
        .route("/{id}", get(crate::card::handlers::get_card))
        .route("/{id}", delete(crate::card::handlers::delete_card))
        .route("/{id}/balance", get(crate::card::handlers::get_balance))
        .route("/{id}/status", put(crate::card::handlers::update_status))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    // User management; every handler requires the admin role
    let user_routes = Router::new()
        .route("/", get(crate::user::handlers::list_users))
        .route("/", post(crate::user::handlers::create_user))
        .route("/{id}", get(crate::user::handlers::get_user))
        .route("/{id}", put(crate::user::handlers::update_user))
        .route("/{id}", delete(crate::user::handlers::delete_user))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/cards", card_routes)
        .nest("/api/v1/users", user_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs at http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
