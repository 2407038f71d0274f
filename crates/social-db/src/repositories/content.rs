//! PostgreSQL implementation of ContentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use social_core::entities::{Content, ContentDetails, ContentType};
use social_core::search::SIMILARITY_THRESHOLD;
use social_core::traits::{ContentRepository, ContentSearch, RepoResult};
use social_core::value_objects::Snowflake;

use crate::mappers::{content_type_filter, ContentColumns};
use crate::models::{ContentDetailsModel, ContentModel};

use super::error::{content_not_found, map_db_error, raw_ids};

/// Content joined with owner fields, hashtag names and likers.
/// Callers append `WHERE`/`ORDER BY`.
const DETAILS_SELECT: &str = r"
    SELECT c.id, c.owner_id, c.content_type, c.description, c.thumbnail, c.file,
           c.media_type, c.created_at, c.updated_at,
           u.username AS owner_username,
           u.is_active AS owner_is_active,
           u.is_private AS owner_is_private,
           ARRAY(
               SELECT h.name::TEXT FROM content_hashtags ch
               JOIN hashtags h ON h.id = ch.hashtag_id
               WHERE ch.content_id = c.id
               ORDER BY h.name
           ) AS hashtags,
           ARRAY(
               SELECT l.user_id FROM content_likes l
               WHERE l.content_id = c.id
               ORDER BY l.created_at, l.user_id
           ) AS liked_by
    FROM contents c
    LEFT JOIN users u ON u.id = c.owner_id
";

fn into_details(rows: Vec<ContentDetailsModel>) -> RepoResult<Vec<ContentDetails>> {
    rows.into_iter().map(ContentDetails::try_from).collect()
}

/// PostgreSQL implementation of ContentRepository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Content>> {
        let result = sqlx::query_as::<_, ContentModel>(
            r"
            SELECT id, owner_id, content_type, description, thumbnail, file, media_type,
                   created_at, updated_at
            FROM contents
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Content::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_details(&self, id: Snowflake) -> RepoResult<Option<ContentDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE c.id = $1");
        let result = sqlx::query_as::<_, ContentDetailsModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(ContentDetails::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_owner(
        &self,
        owner_id: Snowflake,
        content_type: Option<ContentType>,
    ) -> RepoResult<Vec<ContentDetails>> {
        let sql = format!(
            "{DETAILS_SELECT}
             WHERE c.owner_id = $1 AND ($2::TEXT IS NULL OR c.content_type = $2)
             ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ContentDetailsModel>(&sql)
            .bind(owner_id.into_inner())
            .bind(content_type_filter(content_type))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_details(rows)
    }

    #[instrument(skip(self, content), fields(content_id = %content.id))]
    async fn create(&self, content: &Content) -> RepoResult<()> {
        let columns = ContentColumns::new(content);
        sqlx::query(
            r"
            INSERT INTO contents (id, owner_id, content_type, description, thumbnail, file,
                                  media_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(columns.id)
        .bind(columns.owner_id)
        .bind(columns.content_type)
        .bind(columns.description)
        .bind(columns.thumbnail)
        .bind(columns.file)
        .bind(columns.media_type)
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, content), fields(content_id = %content.id))]
    async fn update(&self, content: &Content) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE contents
            SET description = $2, thumbnail = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(content.id.into_inner())
        .bind(&content.description)
        .bind(&content.thumbnail)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(content_not_found(content.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        // likes, comments and hashtag links go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn add_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO content_likes (content_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (content_id, user_id) DO NOTHING
            ",
        )
        .bind(content_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn remove_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM content_likes WHERE content_id = $1 AND user_id = $2")
            .bind(content_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    /// Holds a row lock on the content row so toggles on the same item
    /// serialize; the like rows themselves may not exist yet.
    #[instrument(skip(self))]
    async fn toggle_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM contents WHERE id = $1 FOR NO KEY UPDATE",
        )
        .bind(content_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;
        if exists.is_none() {
            return Err(content_not_found(content_id));
        }

        let removed = sqlx::query("DELETE FROM content_likes WHERE content_id = $1 AND user_id = $2")
            .bind(content_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        let liked = removed.rows_affected() == 0;
        if liked {
            sqlx::query(
                "INSERT INTO content_likes (content_id, user_id, created_at) VALUES ($1, $2, NOW())",
            )
            .bind(content_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(liked)
    }

    #[instrument(skip(self))]
    async fn has_liked(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM content_likes WHERE content_id = $1 AND user_id = $2)",
        )
        .bind(content_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_recent(&self, since: DateTime<Utc>) -> RepoResult<Vec<ContentDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE c.created_at >= $1 ORDER BY c.created_at DESC");
        let rows = sqlx::query_as::<_, ContentDetailsModel>(&sql)
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_details(rows)
    }

    #[instrument(skip(self, owner_ids), fields(owners = owner_ids.len()))]
    async fn find_by_owners(&self, owner_ids: &[Snowflake]) -> RepoResult<Vec<ContentDetails>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{DETAILS_SELECT} WHERE c.owner_id = ANY($1) ORDER BY c.created_at DESC");
        let rows = sqlx::query_as::<_, ContentDetailsModel>(&sql)
            .bind(raw_ids(owner_ids))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_details(rows)
    }

    #[instrument(skip(self))]
    async fn find_by_hashtags(&self, names: &[String]) -> RepoResult<Vec<ContentDetails>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{DETAILS_SELECT}
             WHERE EXISTS (
                 SELECT 1 FROM content_hashtags ch
                 JOIN hashtags h ON h.id = ch.hashtag_id
                 WHERE ch.content_id = c.id AND h.name = ANY($1)
             )
             ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ContentDetailsModel>(&sql)
            .bind(names.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_details(rows)
    }

    #[instrument(skip(self))]
    async fn search(&self, filter: &ContentSearch) -> RepoResult<Vec<ContentDetails>> {
        let sql = format!(
            "{DETAILS_SELECT}
             WHERE ($1::TEXT IS NULL OR similarity(c.description, $1) > $4)
               AND ($2::TEXT IS NULL OR c.content_type = $2)
               AND ($3::TEXT IS NULL OR EXISTS (
                   SELECT 1 FROM content_hashtags ch
                   JOIN hashtags h ON h.id = ch.hashtag_id
                   WHERE ch.content_id = c.id AND LOWER(h.name) = LOWER($3)
               ))
             ORDER BY CASE WHEN $1::TEXT IS NULL THEN 0
                           ELSE similarity(c.description, $1) END DESC,
                      c.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ContentDetailsModel>(&sql)
            .bind(filter.query.as_deref())
            .bind(content_type_filter(filter.content_type))
            .bind(filter.hashtag.as_deref())
            .bind(SIMILARITY_THRESHOLD as f32)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_details(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgContentRepository>();
    }
}
