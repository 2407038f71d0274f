//! # social-db
//!
//! Persistence layer implementing the repository traits of `social-core`.
//!
//! - PostgreSQL repositories via SQLx (runtime queries, `FromRow` models,
//!   model -> entity mappers)
//! - Schema migrations applied at runtime ([`run_migrations`], `social-migrate`)
//! - An in-memory backend ([`memory::MemoryDatabase`]) with the same semantics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use social_db::{create_pool, run_migrations, default_migrations_dir, DatabaseConfig};
//! use social_db::repositories::PgConnectionRepository;
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! run_migrations(&pool, &default_migrations_dir()).await?;
//! let connections = PgConnectionRepository::new(pool);
//! ```

pub mod mappers;
pub mod memory;
pub mod migrate;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryDatabase;
pub use migrate::{default_migrations_dir, run_migrations};
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{
    PgCommentRepository, PgConnectionRepository, PgContentRepository, PgHashtagRepository,
    PgUserRepository,
};
