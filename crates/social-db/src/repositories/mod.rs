//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in social-core.

mod comment;
mod connection;
mod content;
mod error;
mod hashtag;
mod user;

pub use comment::PgCommentRepository;
pub use connection::PgConnectionRepository;
pub use content::PgContentRepository;
pub use hashtag::PgHashtagRepository;
pub use user::PgUserRepository;
