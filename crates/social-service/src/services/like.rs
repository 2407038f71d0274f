//! Like service
//!
//! Membership changes on a content item's like-set. Every operation is
//! idempotent.

use social_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Like service
pub struct LikeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LikeService<'a> {
    /// Create a new LikeService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Returns whether the like-set changed
    #[instrument(skip(self))]
    pub async fn like(&self, user_id: Snowflake, content_id: Snowflake) -> ServiceResult<bool> {
        self.require_content(content_id).await?;
        let added = self.ctx.content_repo().add_like(content_id, user_id).await?;
        if added {
            info!(content_id = %content_id, user_id = %user_id, "Content liked");
        }
        Ok(added)
    }

    /// Returns whether the like-set changed
    #[instrument(skip(self))]
    pub async fn unlike(&self, user_id: Snowflake, content_id: Snowflake) -> ServiceResult<bool> {
        self.require_content(content_id).await?;
        let removed = self
            .ctx
            .content_repo()
            .remove_like(content_id, user_id)
            .await?;
        if removed {
            info!(content_id = %content_id, user_id = %user_id, "Content unliked");
        }
        Ok(removed)
    }

    /// Flip the like and return the new state
    #[instrument(skip(self))]
    pub async fn toggle_like(&self, user_id: Snowflake, content_id: Snowflake) -> ServiceResult<bool> {
        let liked = self.ctx.content_repo().toggle_like(content_id, user_id).await?;
        info!(content_id = %content_id, user_id = %user_id, liked, "Content like toggled");
        Ok(liked)
    }

    async fn require_content(&self, content_id: Snowflake) -> ServiceResult<()> {
        self.ctx
            .content_repo()
            .find_by_id(content_id)
            .await?
            .ok_or(DomainError::ContentNotFound(content_id))?;
        Ok(())
    }
}
