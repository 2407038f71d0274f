//! PostgreSQL implementation of ConnectionRepository
//!
//! Rows are keyed on `(user_low, user_high)`, so every pair lookup goes
//! through [`UserPair`] and hits the primary key.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use social_core::entities::Connection;
use social_core::traits::{ConnectionRepository, RepoResult};
use social_core::value_objects::{Snowflake, UserPair};

use crate::models::ConnectionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ConnectionRepository
#[derive(Clone)]
pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    #[instrument(skip(self))]
    async fn edge_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Connection>> {
        let pair = UserPair::new(a, b);
        let result = sqlx::query_as::<_, ConnectionModel>(
            r"
            SELECT requester_id, receiver_id, accepted, created_at
            FROM connections
            WHERE user_low = $1 AND user_high = $2
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Connection::from))
    }

    #[instrument(skip(self))]
    async fn pending_for(&self, user: Snowflake) -> RepoResult<Vec<Connection>> {
        let results = sqlx::query_as::<_, ConnectionModel>(
            r"
            SELECT requester_id, receiver_id, accepted, created_at
            FROM connections
            WHERE receiver_id = $1 AND NOT accepted
            ORDER BY created_at DESC
            ",
        )
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Connection::from).collect())
    }

    #[instrument(skip(self))]
    async fn sent_by(&self, user: Snowflake) -> RepoResult<Vec<Connection>> {
        let results = sqlx::query_as::<_, ConnectionModel>(
            r"
            SELECT requester_id, receiver_id, accepted, created_at
            FROM connections
            WHERE requester_id = $1 AND NOT accepted
            ORDER BY created_at DESC
            ",
        )
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Connection::from).collect())
    }

    #[instrument(skip(self))]
    async fn accepted_peers(&self, user: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let results = sqlx::query_scalar::<_, i64>(
            r"
            SELECT CASE WHEN requester_id = $1 THEN receiver_id ELSE requester_id END
            FROM connections
            WHERE accepted AND (requester_id = $1 OR receiver_id = $1)
            ",
        )
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self))]
    async fn is_connected(&self, a: Snowflake, b: Snowflake) -> RepoResult<bool> {
        let pair = UserPair::new(a, b);
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM connections
                WHERE user_low = $1 AND user_high = $2 AND accepted
            )
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_peers(&self, user: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM connections
            WHERE accepted AND (requester_id = $1 OR receiver_id = $1)
            ",
        )
        .bind(user.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, connection), fields(requester = %connection.requester, receiver = %connection.receiver))]
    async fn insert_if_absent(&self, connection: &Connection) -> RepoResult<bool> {
        let pair = connection.pair();
        let result = sqlx::query(
            r"
            INSERT INTO connections (user_low, user_high, requester_id, receiver_id, accepted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_low, user_high) DO NOTHING
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(connection.requester.into_inner())
        .bind(connection.receiver.into_inner())
        .bind(connection.accepted)
        .bind(connection.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn accept_pending(&self, requester: Snowflake, receiver: Snowflake) -> RepoResult<bool> {
        let pair = UserPair::new(requester, receiver);
        let result = sqlx::query(
            r"
            UPDATE connections
            SET accepted = TRUE
            WHERE user_low = $1 AND user_high = $2
              AND requester_id = $3 AND NOT accepted
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(requester.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_pending(&self, requester: Snowflake, receiver: Snowflake) -> RepoResult<bool> {
        let pair = UserPair::new(requester, receiver);
        let result = sqlx::query(
            r"
            DELETE FROM connections
            WHERE user_low = $1 AND user_high = $2
              AND requester_id = $3 AND NOT accepted
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(requester.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<bool> {
        let pair = UserPair::new(a, b);
        let result = sqlx::query("DELETE FROM connections WHERE user_low = $1 AND user_high = $2")
            .bind(pair.low().into_inner())
            .bind(pair.high().into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }
}
