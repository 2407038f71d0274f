//! Redis-backed verification code storage.
//!
//! Values expire server-side via `SET ... EX`.

use async_trait::async_trait;
use social_core::traits::{CodeStore, RepoResult};
use tracing::instrument;

use crate::pool::RedisPool;

/// Namespace for code keys
pub const CODE_KEY_PREFIX: &str = "code:";

#[derive(Clone, Debug)]
pub struct RedisCodeStore {
    pool: RedisPool,
}

impl RedisCodeStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(key: &str) -> String {
        format!("{CODE_KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> RepoResult<()> {
        self.pool.set_ex(&Self::key(key), &value, ttl_secs).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.pool.get_value::<String>(&Self::key(key)).await?)
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> RepoResult<bool> {
        Ok(self.pool.delete(&Self::key(key)).await?)
    }
}
