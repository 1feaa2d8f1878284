use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{Claims, ROLE_ADMIN};
use crate::error::ApiError;
use crate::gateway::state::AppState;

/// Request identity established by the JWT middleware.
///
/// Holding a token does not imply owning any card; card ownership is always
/// re-checked against the store by the handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            roles: claims.roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Error unless the identity carries `role`
    pub fn require_role(&self, role: &str) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Access denied".to_string()))
        }
    }
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid token format".to_string()))?;

    // 2. Verify token and bind the identity to this request only;
    //    no session state is kept server-side
    let claims = state.auth.verify_token(token)?;
    request.extensions_mut().insert(AuthUser::from_claims(claims));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthUser {
        AuthUser {
            username: "alice".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_role_membership() {
        let admin = user(&["USER", "ADMIN"]);
        assert!(admin.is_admin());
        assert!(admin.has_role("USER"));

        let plain = user(&["USER"]);
        assert!(!plain.is_admin());
        assert!(plain.require_role("USER").is_ok());
        assert!(matches!(
            plain.require_role("ADMIN"),
            Err(ApiError::Forbidden(_))
        ));
    }
}
