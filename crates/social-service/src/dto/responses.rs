//! Response DTOs
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;
use social_core::{ContentType, MediaType};

// ============================================================================
// User Responses
// ============================================================================

/// Public user response (for viewing other users)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub is_private: bool,
    pub joined_at: DateTime<Utc>,
}

/// The account owner's own view (includes email and security flags)
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub is_private: bool,
    pub is_active: bool,
    pub is_2fa_enabled: bool,
    pub joined_at: DateTime<Utc>,
}

/// Freshly generated TOTP secret; 2FA stays off until a code is confirmed
#[derive(Debug, Clone, Serialize)]
pub struct TotpSetupResponse {
    /// Base32 secret for manual entry
    pub secret: String,
    /// `otpauth://` URI for QR enrolment
    pub provisioning_uri: String,
}

// ============================================================================
// Connection Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResponse {
    pub requester_id: String,
    pub receiver_id: String,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// `ok` when the users are connected right away, `pending` when the receiver
/// still has to accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Ok,
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionRequestResponse {
    pub status: RequestStatus,
    pub connection: ConnectionResponse,
}

impl ConnectionRequestResponse {
    pub fn is_immediate(&self) -> bool {
        self.status == RequestStatus::Ok
    }
}

// ============================================================================
// Content Responses
// ============================================================================

/// Content summary used by listings and discovery feeds
#[derive(Debug, Clone, Serialize)]
pub struct ContentSummaryResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    pub like_count: usize,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Explore score, only present in the explore feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

// ============================================================================
// Comment Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub content_id: String,
    pub author_id: String,
    pub author_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub text: String,
    pub reply_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}
