//! PostgreSQL implementation of HashtagRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use social_core::entities::Hashtag;
use social_core::traits::{HashtagRepository, RepoResult};
use social_core::value_objects::Snowflake;

use crate::models::HashtagModel;

use super::error::{is_foreign_key_violation, map_db_error};

/// PostgreSQL implementation of HashtagRepository
#[derive(Clone)]
pub struct PgHashtagRepository {
    pool: PgPool,
}

impl PgHashtagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HashtagRepository for PgHashtagRepository {
    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Hashtag>> {
        let result =
            sqlx::query_as::<_, HashtagModel>("SELECT id, name FROM hashtags WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(result.map(Hashtag::from))
    }

    #[instrument(skip(self, candidate), fields(name = %candidate.name))]
    async fn get_or_create(&self, candidate: &Hashtag) -> RepoResult<Hashtag> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on conflict
        let result = sqlx::query_as::<_, HashtagModel>(
            r"
            INSERT INTO hashtags (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            ",
        )
        .bind(candidate.id.into_inner())
        .bind(&candidate.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Hashtag::from(result))
    }

    #[instrument(skip(self))]
    async fn attach(&self, hashtag_id: Snowflake, content_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO content_hashtags (hashtag_id, content_id)
            SELECT $1, $2
            WHERE EXISTS (SELECT 1 FROM hashtags WHERE id = $1)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(hashtag_id.into_inner())
        .bind(content_id.into_inner())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            // the hashtag was deleted after the EXISTS check
            Err(e) if is_foreign_key_violation(&e) => Ok(false),
            Err(e) => Err(map_db_error(e)),
        }
    }

    #[instrument(skip(self))]
    async fn detach(&self, hashtag_id: Snowflake, content_id: Snowflake) -> RepoResult<bool> {
        let result =
            sqlx::query("DELETE FROM content_hashtags WHERE hashtag_id = $1 AND content_id = $2")
                .bind(hashtag_id.into_inner())
                .bind(content_id.into_inner())
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_if_orphaned(&self, hashtag_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM hashtags h
            WHERE h.id = $1
              AND NOT EXISTS (SELECT 1 FROM content_hashtags ch WHERE ch.hashtag_id = h.id)
            ",
        )
        .bind(hashtag_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn find_by_content(&self, content_id: Snowflake) -> RepoResult<Vec<Hashtag>> {
        let results = sqlx::query_as::<_, HashtagModel>(
            r"
            SELECT h.id, h.name
            FROM hashtags h
            JOIN content_hashtags ch ON ch.hashtag_id = h.id
            WHERE ch.content_id = $1
            ORDER BY h.name
            ",
        )
        .bind(content_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Hashtag::from).collect())
    }

    #[instrument(skip(self))]
    async fn content_count(&self, hashtag_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM content_hashtags WHERE hashtag_id = $1")
            .bind(hashtag_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn liked_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT h.name::TEXT
            FROM content_likes l
            JOIN content_hashtags ch ON ch.content_id = l.content_id
            JOIN hashtags h ON h.id = ch.hashtag_id
            WHERE l.user_id = $1
            ORDER BY 1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
