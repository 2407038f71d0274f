//! Verification code stores

mod memory_store;
mod redis_store;

pub use memory_store::MemoryCodeStore;
pub use redis_store::{RedisCodeStore, CODE_KEY_PREFIX};
