//! Non-repository ports: short-lived code storage and outbound mail

use async_trait::async_trait;

use super::RepoResult;

/// Key-value store for short-lived verification codes
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl_secs`
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> RepoResult<()>;

    /// Fetch a live value
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Remove a value. Returns whether one was present.
    async fn remove(&self, key: &str) -> RepoResult<bool>;
}

/// Outbound mail delivery
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> RepoResult<()>;
}
