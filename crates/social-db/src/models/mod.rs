//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod connection;
mod content;
mod hashtag;
mod user;

pub use comment::{CommentDetailsModel, CommentModel};
pub use connection::ConnectionModel;
pub use content::{ContentDetailsModel, ContentModel};
pub use hashtag::HashtagModel;
pub use user::UserModel;
