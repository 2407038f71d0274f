//! Content service
//!
//! Posting, editing, deleting and listing content. Hashtag associations are
//! rebuilt around every description change.

use social_core::traits::ContentSearch;
use social_core::{Content, ContentType, DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    ContentSummaryResponse, CreateMediaRequest, CreatePostRequest, SearchContentRequest,
    UpdateContentRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::hashtag::HashtagLinker;
use super::user::UserService;

/// Content service
pub struct ContentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContentService<'a> {
    /// Create a new ContentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn linker(&self) -> HashtagLinker<'a> {
        HashtagLinker::new(self.ctx)
    }

    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        owner_id: Snowflake,
        request: CreatePostRequest,
    ) -> ServiceResult<ContentSummaryResponse> {
        request.validate()?;
        UserService::new(self.ctx).get_user_entity(owner_id).await?;

        let content = Content::post(
            self.ctx.generate_id(),
            owner_id,
            request.description,
            request.thumbnail,
        )?;
        self.publish(content).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_media(
        &self,
        owner_id: Snowflake,
        request: CreateMediaRequest,
    ) -> ServiceResult<ContentSummaryResponse> {
        request.validate()?;
        UserService::new(self.ctx).get_user_entity(owner_id).await?;

        let content = Content::media(
            self.ctx.generate_id(),
            owner_id,
            request.description,
            request.file,
            request.media_type,
            request.thumbnail,
        )?;
        self.publish(content).await
    }

    async fn publish(&self, content: Content) -> ServiceResult<ContentSummaryResponse> {
        self.ctx.content_repo().create(&content).await?;
        self.linker().link(&content).await?;

        info!(
            content_id = %content.id,
            content_type = content.content_type().as_str(),
            "Content created"
        );
        self.get_content(content.id).await
    }

    /// Replace the description. Hashtags of the old text are unlinked before
    /// the update, those of the new text linked after it.
    #[instrument(skip(self, request))]
    pub async fn update_description(
        &self,
        actor: Snowflake,
        content_id: Snowflake,
        request: UpdateContentRequest,
    ) -> ServiceResult<ContentSummaryResponse> {
        request.validate()?;
        Content::validate_description(&request.description)?;
        let mut content = self.require_owned(actor, content_id).await?;

        self.linker().unlink(&content).await?;
        content.set_description(request.description)?;
        self.ctx.content_repo().update(&content).await?;
        self.linker().link(&content).await?;

        info!(content_id = %content_id, "Content description updated");
        self.get_content(content_id).await
    }

    /// Owner-only delete; returns `false` if the row was already gone
    #[instrument(skip(self))]
    pub async fn delete_content(&self, actor: Snowflake, content_id: Snowflake) -> ServiceResult<bool> {
        let content = self.require_owned(actor, content_id).await?;

        self.linker().unlink(&content).await?;
        let deleted = self.ctx.content_repo().delete(content_id).await?;

        info!(content_id = %content_id, "Content deleted");
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn get_content(&self, content_id: Snowflake) -> ServiceResult<ContentSummaryResponse> {
        let details = self
            .ctx
            .content_repo()
            .find_details(content_id)
            .await?
            .ok_or(DomainError::ContentNotFound(content_id))?;
        Ok(ContentSummaryResponse::from(&details))
    }

    /// Content posted by `username`, newest first
    #[instrument(skip(self))]
    pub async fn list_by_owner(
        &self,
        username: &str,
        content_type: Option<ContentType>,
    ) -> ServiceResult<Vec<ContentSummaryResponse>> {
        let owner = UserService::new(self.ctx).get_entity_by_username(username).await?;
        let items = self
            .ctx
            .content_repo()
            .find_by_owner(owner.id, content_type)
            .await?;
        Ok(items.iter().map(ContentSummaryResponse::from).collect())
    }

    /// Description substring and hashtag match case-insensitively
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        request: SearchContentRequest,
    ) -> ServiceResult<Vec<ContentSummaryResponse>> {
        let filter = ContentSearch {
            query: request.query.filter(|q| !q.trim().is_empty()),
            content_type: request.content_type,
            hashtag: request
                .hashtag
                .map(|tag| tag.trim_start_matches('#').to_string())
                .filter(|tag| !tag.is_empty()),
        };
        let items = self.ctx.content_repo().search(&filter).await?;
        Ok(items.iter().map(ContentSummaryResponse::from).collect())
    }

    async fn require_owned(&self, actor: Snowflake, content_id: Snowflake) -> ServiceResult<Content> {
        let content = self
            .ctx
            .content_repo()
            .find_by_id(content_id)
            .await?
            .ok_or(DomainError::ContentNotFound(content_id))?;

        if !content.is_owned_by(actor) {
            return Err(DomainError::NotContentOwner.into());
        }
        Ok(content)
    }
}
