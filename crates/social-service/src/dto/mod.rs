//! Data transfer objects for service inputs and outputs
//!
//! This module provides:
//! - Request DTOs with validation for caller inputs
//! - Response DTOs for serializing results
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    ChangeEmailRequest, ChangePasswordRequest, CreateCommentRequest, CreateMediaRequest,
    CreatePostRequest, PasswordResetRequest, RegisterRequest, SearchContentRequest,
    UpdateContentRequest, UpdateProfileRequest,
};

pub use responses::{
    CommentResponse, ConnectionRequestResponse, ConnectionResponse, ContentSummaryResponse,
    CurrentUserResponse, RequestStatus, TotpSetupResponse, UserResponse,
};
