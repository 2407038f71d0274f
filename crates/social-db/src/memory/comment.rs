//! In-memory implementation of CommentRepository

use async_trait::async_trait;

use social_core::entities::{Comment, CommentDetails};
use social_core::error::DomainError;
use social_core::traits::{CommentRepository, RepoResult};
use social_core::value_objects::Snowflake;

use super::tables::Tables;
use super::Shared;

#[derive(Clone)]
pub struct MemoryCommentRepository {
    tables: Shared,
}

impl MemoryCommentRepository {
    pub(super) fn new(tables: Shared) -> Self {
        Self { tables }
    }

    fn details_where(&self, pred: impl Fn(&Comment) -> bool) -> Vec<CommentDetails> {
        let tables = self.tables.read();
        let mut items: Vec<CommentDetails> = tables
            .comments
            .values()
            .filter(|c| pred(c))
            .filter_map(|c| comment_details(&tables, c))
            .collect();
        items.sort_by(|a, b| {
            a.comment
                .created_at
                .cmp(&b.comment.created_at)
                .then_with(|| a.comment.id.cmp(&b.comment.id))
        });
        items
    }
}

fn comment_details(tables: &Tables, comment: &Comment) -> Option<CommentDetails> {
    let author = tables.users.get(&comment.user_id)?;
    Some(CommentDetails {
        comment: comment.clone(),
        author_username: author.user.username.clone(),
        reply_count: tables
            .comments
            .values()
            .filter(|c| c.reply_to == Some(comment.id))
            .count() as i64,
        like_count: tables
            .comment_likes
            .iter()
            .filter(|(c, _)| *c == comment.id)
            .count() as i64,
    })
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        Ok(self.tables.read().comments.get(&id).cloned())
    }

    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if !tables.contents.contains_key(&comment.content_id) {
            return Err(DomainError::ContentNotFound(comment.content_id));
        }
        if let Some(parent) = comment.reply_to {
            if !tables.comments.contains_key(&parent) {
                return Err(DomainError::CommentNotFound(parent));
            }
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self.tables.write().remove_comment_tree(id))
    }

    async fn list_top_level(&self, content_id: Snowflake) -> RepoResult<Vec<CommentDetails>> {
        Ok(self.details_where(|c| c.content_id == content_id && c.reply_to.is_none()))
    }

    async fn list_replies(&self, comment_id: Snowflake) -> RepoResult<Vec<CommentDetails>> {
        Ok(self.details_where(|c| c.reply_to == Some(comment_id)))
    }

    async fn add_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if !tables.comments.contains_key(&comment_id) {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        Ok(tables.comment_likes.insert((comment_id, user_id)))
    }

    async fn remove_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .write()
            .comment_likes
            .remove(&(comment_id, user_id)))
    }

    async fn toggle_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if !tables.comments.contains_key(&comment_id) {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        let key = (comment_id, user_id);
        if tables.comment_likes.remove(&key) {
            return Ok(false);
        }
        Ok(tables.comment_likes.insert(key))
    }

    async fn has_liked(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .read()
            .comment_likes
            .contains(&(comment_id, user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryDatabase;
    use super::*;
    use social_core::entities::{Content, User};
    use social_core::traits::{ContentRepository, UserRepository};

    #[tokio::test]
    async fn test_delete_cascades_to_replies() {
        let db = MemoryDatabase::new();
        let user = User::new(Snowflake::new(1), "u".to_string());
        db.users().create(&user, "h").await.unwrap();
        let post = Content::post(Snowflake::new(10), user.id, "p".to_string(), None).unwrap();
        db.contents().create(&post).await.unwrap();

        let repo = db.comments();
        let top = Comment::new(Snowflake::new(20), post.id, user.id, None, "top".to_string()).unwrap();
        let reply =
            Comment::new(Snowflake::new(21), post.id, user.id, Some(top.id), "re".to_string())
                .unwrap();
        repo.create(&top).await.unwrap();
        repo.create(&reply).await.unwrap();
        repo.add_like(reply.id, user.id).await.unwrap();

        let listed = repo.list_top_level(post.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].reply_count, 1);
        assert_eq!(listed[0].author_username, "u");

        assert!(repo.delete(top.id).await.unwrap());
        assert!(repo.find_by_id(reply.id).await.unwrap().is_none());
        assert!(!repo.has_liked(reply.id, user.id).await.unwrap());
    }
}
