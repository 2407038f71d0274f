//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Rules that need domain knowledge (username characters, password strength,
//! media invariants) are checked again by the services.

use serde::Deserialize;
use social_core::{ContentType, MediaType, Snowflake};
use validator::Validate;

// ============================================================================
// Account Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Profile fields the owner may edit
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150, message = "Full name must be at most 150 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 512, message = "Bio must be at most 512 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset with a mailed code
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

// ============================================================================
// Content Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 512, message = "Description must be 1-512 characters"))]
    pub description: String,

    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMediaRequest {
    #[validate(length(min = 1, max = 512, message = "Description must be 1-512 characters"))]
    pub description: String,

    /// Opaque reference to the stored file
    #[validate(length(min = 1, message = "A media file must be provided"))]
    pub file: String,

    pub media_type: MediaType,

    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContentRequest {
    #[validate(length(min = 1, max = 512, message = "Description must be 1-512 characters"))]
    pub description: String,
}

/// Content search filters; all optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchContentRequest {
    #[serde(rename = "q")]
    pub query: Option<String>,

    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,

    pub hashtag: Option<String>,
}

// ============================================================================
// Comment Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 512, message = "Comment must be 1-512 characters"))]
    pub text: String,

    /// Comment being replied to
    pub reply_to: Option<Snowflake>,
}
