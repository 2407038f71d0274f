//! # social-service
//!
//! Application layer containing business logic, services, and DTOs.
//!
//! Services borrow a [`ServiceContext`] that holds every repository and port
//! as `Arc<dyn Trait>`, so the same code runs over PostgreSQL/Redis or the
//! in-memory backend.

pub mod dto;
pub mod services;

pub use services::{
    AccountService, CodePurpose, CommentService, ConnectionService, ContentService,
    DiscoveryService, HashtagLinker, LikeService, LogMailer, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
