//! Authentication and authorization
//!
//! Stateless JWT sessions: login verifies the argon2 password hash and
//! mints a token carrying the username and a copy of the user's roles.
//! Every protected request is validated by [`middleware::jwt_auth_middleware`]
//! which binds an [`AuthUser`] identity to the request.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use middleware::AuthUser;
pub use service::{AuthService, Claims, hash_password};

/// Role labels checked by the authorization layer.
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";
