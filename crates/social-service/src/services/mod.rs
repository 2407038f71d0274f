//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod account;
pub mod comment;
pub mod connection;
pub mod content;
pub mod context;
pub mod discovery;
pub mod error;
pub mod hashtag;
pub mod like;
pub mod mailer;
pub mod user;

// Re-export all services for convenience
pub use account::{AccountService, CodePurpose};
pub use comment::CommentService;
pub use connection::ConnectionService;
pub use content::ContentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use discovery::DiscoveryService;
pub use error::{ServiceError, ServiceResult};
pub use hashtag::HashtagLinker;
pub use like::LikeService;
pub use mailer::LogMailer;
pub use user::UserService;
