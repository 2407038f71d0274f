//! Ports - traits implemented by the infrastructure layer

mod ports;
mod repositories;

pub use ports::{CodeStore, Mailer};
pub use repositories::{
    CommentRepository, ConnectionRepository, ContentRepository, ContentSearch, HashtagRepository,
    RepoResult, UserRepository,
};
