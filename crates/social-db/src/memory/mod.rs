//! In-memory backend
//!
//! Implements every repository trait over one shared table set guarded by a
//! `parking_lot::RwLock`. Each trait method takes the lock once, so every
//! repository primitive is atomic just like its SQL counterpart. Used by the
//! service tests and anywhere a database is not available.

mod comment;
mod connection;
mod content;
mod hashtag;
mod tables;
mod user;

use std::sync::Arc;

use parking_lot::RwLock;

pub use comment::MemoryCommentRepository;
pub use connection::MemoryConnectionRepository;
pub use content::MemoryContentRepository;
pub use hashtag::MemoryHashtagRepository;
pub use user::MemoryUserRepository;

use tables::Tables;

type Shared = Arc<RwLock<Tables>>;

/// Handle to an in-memory database; repositories created from the same
/// handle see each other's writes
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Shared,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository::new(Arc::clone(&self.tables))
    }

    pub fn connections(&self) -> MemoryConnectionRepository {
        MemoryConnectionRepository::new(Arc::clone(&self.tables))
    }

    pub fn contents(&self) -> MemoryContentRepository {
        MemoryContentRepository::new(Arc::clone(&self.tables))
    }

    pub fn hashtags(&self) -> MemoryHashtagRepository {
        MemoryHashtagRepository::new(Arc::clone(&self.tables))
    }

    pub fn comments(&self) -> MemoryCommentRepository {
        MemoryCommentRepository::new(Arc::clone(&self.tables))
    }

    /// Number of connection rows, pending or accepted
    pub fn connection_rows(&self) -> usize {
        self.tables.read().connections.len()
    }
}
