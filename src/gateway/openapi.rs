//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::card::models::{BalanceDto, CardDto, CreateCardRequest, TransferRequest};
use crate::gateway::handlers::HealthResponse;
use crate::user::models::{UpdateUserRequest, UserDto};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT obtained from POST /api/v1/auth/login, sent as \
                             `Authorization: Bearer <token>`",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CardVault API",
        version = "1.0.0",
        description = "Bank card management: cards, balances, intra-owner transfers, \
                       JWT role-based access control.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        // Auth
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        // Cards
        crate::card::handlers::list_cards,
        crate::card::handlers::get_card,
        crate::card::handlers::get_balance,
        crate::card::handlers::create_card,
        crate::card::handlers::update_status,
        crate::card::handlers::delete_card,
        crate::card::handlers::transfer,
        // Users (admin)
        crate::user::handlers::list_users,
        crate::user::handlers::get_user,
        crate::user::handlers::create_user,
        crate::user::handlers::update_user,
        crate::user::handlers::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            CardDto,
            CreateCardRequest,
            TransferRequest,
            BalanceDto,
            UserDto,
            UpdateUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and registration (no auth required)"),
        (name = "Cards", description = "Card management and transfers (auth required)"),
        (name = "Users", description = "User management (admin only)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "CardVault API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json();
        assert!(json.is_ok());
        let json_str = json.unwrap();
        assert!(json_str.contains("CardVault API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/auth/login"));
        assert!(paths.paths.contains_key("/api/v1/cards"));
        assert!(paths.paths.contains_key("/api/v1/cards/transfer"));
        assert!(paths.paths.contains_key("/api/v1/users/{id}"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}
