//! # social-cache
//!
//! Key-value storage for short-lived verification codes.
//!
//! - **Connection Pool**: managed Redis connection pool with deadpool
//! - **Code stores**: [`RedisCodeStore`] for deployments, [`MemoryCodeStore`]
//!   for tests and single-process runs; both implement `social_core::CodeStore`
//!
//! ## Example
//!
//! ```ignore
//! use social_cache::{RedisCodeStore, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let codes = RedisCodeStore::new(pool);
//! codes.put("reset_password:alice", "123456", 600).await?;
//! ```

pub mod codes;
pub mod pool;

pub use codes::{MemoryCodeStore, RedisCodeStore, CODE_KEY_PREFIX};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
