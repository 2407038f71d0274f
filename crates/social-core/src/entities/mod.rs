//! Domain entities - core business objects

mod comment;
mod connection;
mod content;
mod hashtag;
mod user;

pub use comment::{Comment, CommentDetails};
pub use connection::{Connection, ConnectionState};
pub use content::{Content, ContentDetails, ContentKind, ContentOwner, ContentType, MediaType};
pub use hashtag::Hashtag;
pub use user::User;
