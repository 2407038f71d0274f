//! User service
//!
//! Handles profile lookups, privacy and deactivation.

use social_core::{DomainError, Snowflake, User};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CurrentUserResponse, UpdateProfileRequest, UserResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get user entity by ID
    #[instrument(skip(self))]
    pub async fn get_user_entity(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id).into())
    }

    /// Get user entity by username
    #[instrument(skip(self))]
    pub async fn get_entity_by_username(&self, username: &str) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UsernameNotFound(username.to_string()).into())
    }

    /// Public profile by username
    #[instrument(skip(self))]
    pub async fn get_by_username(&self, username: &str) -> ServiceResult<UserResponse> {
        let user = self.get_entity_by_username(username).await?;
        Ok(UserResponse::from(&user))
    }

    /// The account owner's own profile
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, user_id: Snowflake) -> ServiceResult<CurrentUserResponse> {
        let user = self.get_user_entity(user_id).await?;
        Ok(CurrentUserResponse::from(&user))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Snowflake,
        request: UpdateProfileRequest,
    ) -> ServiceResult<CurrentUserResponse> {
        request.validate()?;
        let mut user = self.get_user_entity(user_id).await?;

        let mut changed = false;
        if let Some(full_name) = request.full_name {
            user.full_name = Some(full_name).filter(|name| !name.is_empty());
            changed = true;
        }
        if let Some(bio) = request.bio {
            user.bio = Some(bio).filter(|bio| !bio.is_empty());
            changed = true;
        }

        if changed {
            self.ctx.user_repo().update(&user).await?;
            info!(user_id = %user_id, "User profile updated");
        }

        Ok(CurrentUserResponse::from(&user))
    }

    /// Toggle whether connection requests need approval
    #[instrument(skip(self))]
    pub async fn set_private(
        &self,
        user_id: Snowflake,
        is_private: bool,
    ) -> ServiceResult<CurrentUserResponse> {
        let mut user = self.get_user_entity(user_id).await?;
        if user.is_private != is_private {
            user.is_private = is_private;
            self.ctx.user_repo().update(&user).await?;
            info!(user_id = %user_id, is_private, "Account privacy changed");
        }
        Ok(CurrentUserResponse::from(&user))
    }

    /// Moderation: hide the account from discovery. Returns `false` if it was
    /// already inactive.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, user_id: Snowflake) -> ServiceResult<bool> {
        let mut user = self.get_user_entity(user_id).await?;
        if !user.is_active {
            return Ok(false);
        }

        user.is_active = false;
        self.ctx.user_repo().update(&user).await?;
        info!(user_id = %user_id, "User deactivated");
        Ok(true)
    }
}
