//! Comment service
//!
//! Comments with one level of replies, plus comment likes.

use social_core::{Comment, CommentDetails, DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CommentResponse, CreateCommentRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::user::UserService;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Comment on content. A reply to a reply is attached to the top-level
    /// comment it belongs to.
    #[instrument(skip(self, request))]
    pub async fn create_comment(
        &self,
        user_id: Snowflake,
        content_id: Snowflake,
        request: CreateCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        request.validate()?;
        let author = UserService::new(self.ctx).get_user_entity(user_id).await?;
        self.require_content(content_id).await?;

        let reply_to = match request.reply_to {
            Some(parent_id) => {
                let parent = self.require_comment_on(content_id, parent_id).await?;
                Some(parent.reply_to.unwrap_or(parent.id))
            }
            None => None,
        };

        let comment = Comment::new(
            self.ctx.generate_id(),
            content_id,
            user_id,
            reply_to,
            request.text,
        )?;
        self.ctx.comment_repo().create(&comment).await?;

        info!(
            comment_id = %comment.id,
            content_id = %content_id,
            is_reply = comment.is_reply(),
            "Comment created"
        );

        Ok(CommentResponse::from(CommentDetails {
            comment,
            author_username: author.username,
            reply_count: 0,
            like_count: 0,
        }))
    }

    /// Author-only; replies go with the comment
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, actor: Snowflake, comment_id: Snowflake) -> ServiceResult<bool> {
        let comment = self
            .ctx
            .comment_repo()
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::CommentNotFound(comment_id))?;

        if !comment.is_authored_by(actor) {
            return Err(DomainError::NotCommentAuthor.into());
        }

        let deleted = self.ctx.comment_repo().delete(comment_id).await?;
        info!(comment_id = %comment_id, "Comment deleted");
        Ok(deleted)
    }

    /// Top-level comments, oldest first
    #[instrument(skip(self))]
    pub async fn list_comments(&self, content_id: Snowflake) -> ServiceResult<Vec<CommentResponse>> {
        self.require_content(content_id).await?;
        let comments = self.ctx.comment_repo().list_top_level(content_id).await?;
        Ok(comments.iter().map(CommentResponse::from).collect())
    }

    /// Replies to a comment on `content_id`, oldest first
    #[instrument(skip(self))]
    pub async fn list_replies(
        &self,
        content_id: Snowflake,
        comment_id: Snowflake,
    ) -> ServiceResult<Vec<CommentResponse>> {
        self.require_comment_on(content_id, comment_id).await?;
        let replies = self.ctx.comment_repo().list_replies(comment_id).await?;
        Ok(replies.iter().map(CommentResponse::from).collect())
    }

    /// Flip the like and return the new state
    #[instrument(skip(self))]
    pub async fn toggle_comment_like(
        &self,
        user_id: Snowflake,
        comment_id: Snowflake,
    ) -> ServiceResult<bool> {
        let liked = self.ctx.comment_repo().toggle_like(comment_id, user_id).await?;
        info!(comment_id = %comment_id, user_id = %user_id, liked, "Comment like toggled");
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

    /// The comment, if it exists and belongs to `content_id`
    async fn require_comment_on(
        &self,
        content_id: Snowflake,
        comment_id: Snowflake,
    ) -> ServiceResult<Comment> {
        match self.ctx.comment_repo().find_by_id(comment_id).await? {
            Some(comment) if comment.content_id == content_id => Ok(comment),
            _ => Err(DomainError::CommentNotFound(comment_id).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::RegisterRequest;
    use crate::services::AccountService;
    use social_core::Content;
    use social_db::MemoryDatabase;

    struct Fixture {
        ctx: ServiceContext,
        alice: Snowflake,
        bob: Snowflake,
        content_id: Snowflake,
    }

    async fn setup() -> Fixture {
        let ctx = ServiceContext::in_memory(&MemoryDatabase::new());
        let mut ids = Vec::new();
        for username in ["alice", "bob"] {
            let user = AccountService::new(&ctx)
                .register(RegisterRequest {
                    username: username.to_string(),
                    email: None,
                    password: "Secret123".to_string(),
                })
                .await
                .unwrap();
            ids.push(Snowflake::parse(&user.id).unwrap());
        }

        let content =
            Content::post(ctx.generate_id(), ids[0], "photo".to_string(), None).unwrap();
        ctx.content_repo().create(&content).await.unwrap();

        Fixture {
            ctx,
            alice: ids[0],
            bob: ids[1],
            content_id: content.id,
        }
    }

    fn text(text: &str, reply_to: Option<Snowflake>) -> CreateCommentRequest {
        CreateCommentRequest {
            text: text.to_string(),
            reply_to,
        }
    }

    fn id_of(response: &CommentResponse) -> Snowflake {
        Snowflake::parse(&response.id).unwrap()
    }

    #[tokio::test]
    async fn test_threading_stays_one_level_deep() {
        let fx = setup().await;
        let service = CommentService::new(&fx.ctx);

        let top = service
            .create_comment(fx.alice, fx.content_id, text("first", None))
            .await
            .unwrap();
        let reply = service
            .create_comment(fx.bob, fx.content_id, text("reply", Some(id_of(&top))))
            .await
            .unwrap();
        let nested = service
            .create_comment(fx.alice, fx.content_id, text("nested", Some(id_of(&reply))))
            .await
            .unwrap();

        assert_eq!(reply.reply_to, Some(top.id.clone()));
        assert_eq!(nested.reply_to, Some(top.id.clone()));

        let listed = service.list_comments(fx.content_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].reply_count, 2);

        let replies = service.list_replies(fx.content_id, id_of(&top)).await.unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].author_username, "bob");
    }

    #[tokio::test]
    async fn test_reply_target_must_be_on_same_content() {
        let fx = setup().await;
        let service = CommentService::new(&fx.ctx);

        let other =
            Content::post(fx.ctx.generate_id(), fx.bob, "other".to_string(), None).unwrap();
        fx.ctx.content_repo().create(&other).await.unwrap();
        let elsewhere = service
            .create_comment(fx.bob, other.id, text("hi", None))
            .await
            .unwrap();

        let err = service
            .create_comment(fx.alice, fx.content_id, text("x", Some(id_of(&elsewhere))))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_COMMENT");

        let err = service
            .create_comment(fx.alice, Snowflake::new(404), text("x", None))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CONTENT");
    }

    #[tokio::test]
    async fn test_delete_by_author_only_cascades() {
        let fx = setup().await;
        let service = CommentService::new(&fx.ctx);

        let top = service
            .create_comment(fx.alice, fx.content_id, text("first", None))
            .await
            .unwrap();
        service
            .create_comment(fx.bob, fx.content_id, text("reply", Some(id_of(&top))))
            .await
            .unwrap();

        let err = service.delete_comment(fx.bob, id_of(&top)).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        assert!(service.delete_comment(fx.alice, id_of(&top)).await.unwrap());
        assert!(service.list_comments(fx.content_id).await.unwrap().is_empty());
        assert!(service
            .list_replies(fx.content_id, id_of(&top))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_toggle_comment_like() {
        let fx = setup().await;
        let service = CommentService::new(&fx.ctx);
        let top = service
            .create_comment(fx.alice, fx.content_id, text("like me", None))
            .await
            .unwrap();

        assert!(service.toggle_comment_like(fx.bob, id_of(&top)).await.unwrap());
        assert_eq!(service.list_comments(fx.content_id).await.unwrap()[0].like_count, 1);
        assert!(!service.toggle_comment_like(fx.bob, id_of(&top)).await.unwrap());
        assert_eq!(service.list_comments(fx.content_id).await.unwrap()[0].like_count, 0);

        let err = service
            .toggle_comment_like(fx.bob, Snowflake::new(404))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_COMMENT");
    }

    #[tokio::test]
    async fn test_rejects_empty_text() {
        let fx = setup().await;
        let err = CommentService::new(&fx.ctx)
            .create_comment(fx.alice, fx.content_id, text("", None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
