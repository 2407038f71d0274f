//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use social_core::entities::{Comment, CommentDetails};
use social_core::traits::{CommentRepository, RepoResult};
use social_core::value_objects::Snowflake;
use social_core::DomainError;

use crate::models::{CommentDetailsModel, CommentModel};

use super::error::map_db_error;

const DETAILS_SELECT: &str = r"
    SELECT cm.id, cm.content_id, cm.user_id, cm.reply_to, cm.text, cm.created_at,
           u.username AS author_username,
           (SELECT COUNT(*) FROM comments r WHERE r.reply_to = cm.id) AS reply_count,
           (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = cm.id) AS like_count
    FROM comments cm
    JOIN users u ON u.id = cm.user_id
";

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        let result = sqlx::query_as::<_, CommentModel>(
            r"
            SELECT id, content_id, user_id, reply_to, text, created_at
            FROM comments
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Comment::from))
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id))]
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO comments (id, content_id, user_id, reply_to, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(comment.id.into_inner())
        .bind(comment.content_id.into_inner())
        .bind(comment.user_id.into_inner())
        .bind(comment.reply_to.map(Snowflake::into_inner))
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn list_top_level(&self, content_id: Snowflake) -> RepoResult<Vec<CommentDetails>> {
        let sql = format!(
            "{DETAILS_SELECT} WHERE cm.content_id = $1 AND cm.reply_to IS NULL ORDER BY cm.created_at, cm.id"
        );
        let results = sqlx::query_as::<_, CommentDetailsModel>(&sql)
            .bind(content_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(CommentDetails::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_replies(&self, comment_id: Snowflake) -> RepoResult<Vec<CommentDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE cm.reply_to = $1 ORDER BY cm.created_at, cm.id");
        let results = sqlx::query_as::<_, CommentDetailsModel>(&sql)
            .bind(comment_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(CommentDetails::from).collect())
    }

    #[instrument(skip(self))]
    async fn add_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO comment_likes (comment_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (comment_id, user_id) DO NOTHING
            ",
        )
        .bind(comment_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn remove_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    /// Holds a row lock on the comment row so toggles on the same item
    /// serialize; the like rows themselves may not exist yet.
    #[instrument(skip(self))]
    async fn toggle_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM comments WHERE id = $1 FOR NO KEY UPDATE",
        )
        .bind(comment_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;
        if exists.is_none() {
            return Err(DomainError::CommentNotFound(comment_id));
        }

        let removed = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        let liked = removed.rows_affected() == 0;
        if liked {
            sqlx::query(
                "INSERT INTO comment_likes (comment_id, user_id, created_at) VALUES ($1, $2, NOW())",
            )
            .bind(comment_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(liked)
    }

    #[instrument(skip(self))]
    async fn has_liked(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE comment_id = $1 AND user_id = $2)",
        )
        .bind(comment_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
