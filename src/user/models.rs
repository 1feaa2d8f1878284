//! User data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User account row. The password hash never leaves this type unmasked;
/// clients only ever see [`UserDto`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_dto(&self) -> UserDto {
        UserDto {
            id: self.user_id,
            username: self.username.clone(),
            roles: self.roles.clone(),
            created_at: self.created_at,
        }
    }
}

/// User as rendered to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "john_doe")]
    pub username: String,
    #[schema(example = json!(["USER"]))]
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin user update: both fields optional, absent means unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[schema(example = json!(["USER", "ADMIN"]))]
    pub roles: Option<Vec<String>>,
}
