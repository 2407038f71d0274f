//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use social_core::ranking::ScoredContent;
use social_core::{CommentDetails, Connection, ContentDetails, ContentKind, User};

use super::responses::{
    CommentResponse, ConnectionRequestResponse, ConnectionResponse, ContentSummaryResponse,
    CurrentUserResponse, RequestStatus, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            is_private: user.is_private,
            joined_at: user.joined_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            is_private: user.is_private,
            is_active: user.is_active,
            is_2fa_enabled: user.is_2fa_enabled,
            joined_at: user.joined_at,
        }
    }
}

// ============================================================================
// Connection Mappers
// ============================================================================

impl From<&Connection> for ConnectionResponse {
    fn from(connection: &Connection) -> Self {
        Self {
            requester_id: connection.requester.to_string(),
            receiver_id: connection.receiver.to_string(),
            accepted: connection.accepted,
            created_at: connection.created_at,
        }
    }
}

impl From<&Connection> for ConnectionRequestResponse {
    fn from(connection: &Connection) -> Self {
        let status = if connection.accepted {
            RequestStatus::Ok
        } else {
            RequestStatus::Pending
        };
        Self {
            status,
            connection: ConnectionResponse::from(connection),
        }
    }
}

// ============================================================================
// Content Mappers
// ============================================================================

impl From<&ContentDetails> for ContentSummaryResponse {
    fn from(details: &ContentDetails) -> Self {
        let content = &details.content;
        let (file, media_type) = match &content.kind {
            ContentKind::Post => (None, None),
            ContentKind::Media { file, media_type } => (Some(file.clone()), Some(*media_type)),
        };

        Self {
            id: content.id.to_string(),
            content_type: content.content_type(),
            owner_id: content.owner_id.map(|id| id.to_string()),
            owner_username: details.owner_username().map(str::to_string),
            description: content.description.clone(),
            thumbnail: content.thumbnail.clone(),
            file,
            media_type,
            like_count: details.like_count(),
            hashtags: details.hashtags.clone(),
            created_at: content.created_at,
            updated_at: content.updated_at,
            score: None,
        }
    }
}

impl From<ContentDetails> for ContentSummaryResponse {
    fn from(details: ContentDetails) -> Self {
        Self::from(&details)
    }
}

impl From<ScoredContent> for ContentSummaryResponse {
    fn from(scored: ScoredContent) -> Self {
        Self {
            score: Some(scored.score.total()),
            ..Self::from(&scored.details)
        }
    }
}

// ============================================================================
// Comment Mappers
// ============================================================================

impl From<&CommentDetails> for CommentResponse {
    fn from(details: &CommentDetails) -> Self {
        let comment = &details.comment;
        Self {
            id: comment.id.to_string(),
            content_id: comment.content_id.to_string(),
            author_id: comment.user_id.to_string(),
            author_username: details.author_username.clone(),
            reply_to: comment.reply_to.map(|id| id.to_string()),
            text: comment.text.clone(),
            reply_count: details.reply_count,
            like_count: details.like_count,
            created_at: comment.created_at,
        }
    }
}

impl From<CommentDetails> for CommentResponse {
    fn from(details: CommentDetails) -> Self {
        Self::from(&details)
    }
}
