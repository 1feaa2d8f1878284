//! User management operations (admin surface)

use super::models::{UpdateUserRequest, UserDto};
use super::repository::UserRepository;
use crate::auth::{ROLE_USER, hash_password};
use crate::auth::service::RegisterRequest;
use crate::db::Database;
use crate::error::ApiError;
use crate::gateway::types::{Page, PageParams};
use validator::Validate;

pub struct UserService;

impl UserService {
    pub async fn list(db: &Database, params: PageParams) -> Result<Page<UserDto>, ApiError> {
        let (_, size) = params.normalized();
        let users = UserRepository::list(db.pool(), size, params.offset()).await?;
        let total = UserRepository::count(db.pool()).await?;
        let items = users.iter().map(|u| u.to_dto()).collect();
        Ok(Page::new(items, params, total))
    }

    pub async fn get(db: &Database, user_id: i64) -> Result<UserDto, ApiError> {
        let user = UserRepository::find_by_id(db.pool(), user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        Ok(user.to_dto())
    }

    /// Same rules as self-registration; admins just reach it via the user
    /// management surface.
    pub async fn create(db: &Database, req: RegisterRequest) -> Result<UserDto, ApiError> {
        req.validate()
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;

        if UserRepository::find_by_username(db.pool(), &req.username)
            .await?
            .is_some()
        {
            return Err(ApiError::InvalidArgument(
                "Username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let user_id = UserRepository::insert(
            db.pool(),
            &req.username,
            &password_hash,
            &[ROLE_USER.to_string()],
        )
        .await?;

        tracing::info!(user_id, username = %req.username, "user created by admin");
        Self::get(db, user_id).await
    }

    pub async fn update(
        db: &Database,
        user_id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserDto, ApiError> {
        req.validate()
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;

        if !UserRepository::exists(db.pool(), user_id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        if let Some(password) = &req.password {
            let password_hash = hash_password(password)?;
            UserRepository::update_password(db.pool(), user_id, &password_hash).await?;
        }

        // Live tokens keep their issued role snapshot until expiry
        if let Some(roles) = &req.roles {
            if roles.is_empty() {
                return Err(ApiError::InvalidArgument(
                    "Role set must not be empty".to_string(),
                ));
            }
            UserRepository::update_roles(db.pool(), user_id, roles).await?;
        }

        Self::get(db, user_id).await
    }

    pub async fn delete(db: &Database, user_id: i64) -> Result<(), ApiError> {
        let removed = UserRepository::delete(db.pool(), user_id).await?;
        if removed == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        tracing::info!(user_id, "user deleted");
        Ok(())
    }
}
