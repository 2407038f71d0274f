//! # social-core
//!
//! Domain layer containing entities, value objects, repository traits, hashtag
//! extraction and the ranking math used by content discovery.
//! This crate has zero dependencies on infrastructure (database, cache, etc.).

pub mod entities;
pub mod error;
pub mod hashtags;
pub mod ranking;
pub mod search;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Comment, CommentDetails, Connection, ConnectionState, Content, ContentDetails, ContentKind,
    ContentOwner, ContentType, Hashtag, MediaType, User,
};
pub use error::{ConnectionConflict, DomainError};
pub use traits::{
    CodeStore, CommentRepository, ConnectionRepository, ContentRepository, ContentSearch,
    HashtagRepository, Mailer, RepoResult, UserRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError, UserPair};
