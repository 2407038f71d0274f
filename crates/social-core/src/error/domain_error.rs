//! Domain errors - error types for the domain layer

use std::fmt;

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Why a connection request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionConflict {
    /// Requester and receiver are the same user
    SelfConnection,
    /// An accepted connection already exists in either direction
    AlreadyConnected,
    /// The requester already has a pending request to the receiver
    DuplicateRequest,
}

impl ConnectionConflict {
    /// Stable machine-readable reason, surfaced to API callers
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SelfConnection => "cannot_connect_to_self",
            Self::AlreadyConnected => "already_connected",
            Self::DuplicateRequest => "request_already_exists",
        }
    }
}

impl fmt::Display for ConnectionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::SelfConnection => "You can't connect to yourself",
            Self::AlreadyConnected => "You are already connected",
            Self::DuplicateRequest => "You have already sent a request to this user",
        };
        f.write_str(message)
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("User not found: {0}")]
    UsernameNotFound(String),

    #[error("Content not found: {0}")]
    ContentNotFound(Snowflake),

    #[error("Comment not found: {0}")]
    CommentNotFound(Snowflake),

    #[error("Hashtag not found: {0}")]
    HashtagNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not content owner")]
    NotContentOwner,

    #[error("Not comment author")]
    NotCommentAuthor,

    #[error("You must be connected to this user to see their connections")]
    ConnectionsHidden,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("A user with that username already exists")]
    UsernameAlreadyExists,

    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("{0}")]
    ConnectionRejected(ConnectionConflict),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) | Self::UsernameNotFound(_) => "UNKNOWN_USER",
            Self::ContentNotFound(_) => "UNKNOWN_CONTENT",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::HashtagNotFound(_) => "UNKNOWN_HASHTAG",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidMedia(_) => "INVALID_MEDIA",

            // Authorization
            Self::NotContentOwner => "NOT_CONTENT_OWNER",
            Self::NotCommentAuthor => "NOT_COMMENT_AUTHOR",
            Self::ConnectionsHidden => "CONNECTIONS_HIDDEN",

            // Conflict
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::ConnectionRejected(conflict) => match conflict {
                ConnectionConflict::SelfConnection => "CANNOT_CONNECT_TO_SELF",
                ConnectionConflict::AlreadyConnected => "ALREADY_CONNECTED",
                ConnectionConflict::DuplicateRequest => "REQUEST_ALREADY_EXISTS",
            },

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::UsernameNotFound(_)
                | Self::ContentNotFound(_)
                | Self::CommentNotFound(_)
                | Self::HashtagNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidUsername(_)
                | Self::WeakPassword(_)
                | Self::ContentTooLong { .. }
                | Self::InvalidMedia(_)
                | Self::ConnectionRejected(ConnectionConflict::SelfConnection)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotContentOwner | Self::NotCommentAuthor | Self::ConnectionsHidden
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::UsernameAlreadyExists
                | Self::EmailAlreadyExists
                | Self::ConnectionRejected(
                    ConnectionConflict::AlreadyConnected | ConnectionConflict::DuplicateRequest
                )
        )
    }

    /// The connection refusal carried by this error, if any
    pub fn connection_conflict(&self) -> Option<ConnectionConflict> {
        match self {
            Self::ConnectionRejected(conflict) => Some(*conflict),
            _ => None,
        }
    }
}

impl From<ConnectionConflict> for DomainError {
    fn from(conflict: ConnectionConflict) -> Self {
        Self::ConnectionRejected(conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::UserNotFound(Snowflake::new(1)).code(), "UNKNOWN_USER");
        assert_eq!(
            DomainError::from(ConnectionConflict::DuplicateRequest).code(),
            "REQUEST_ALREADY_EXISTS"
        );
    }

    #[test]
    fn test_connection_reasons() {
        assert_eq!(ConnectionConflict::SelfConnection.reason(), "cannot_connect_to_self");
        assert_eq!(ConnectionConflict::AlreadyConnected.reason(), "already_connected");
        assert_eq!(ConnectionConflict::DuplicateRequest.reason(), "request_already_exists");
    }

    #[test]
    fn test_self_connection_is_validation_not_conflict() {
        let err = DomainError::from(ConnectionConflict::SelfConnection);
        assert!(err.is_validation());
        assert!(!err.is_conflict());

        let err = DomainError::from(ConnectionConflict::AlreadyConnected);
        assert!(err.is_conflict());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_not_found_is_distinct_from_conflict() {
        let err = DomainError::UsernameNotFound("ghost".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(err.connection_conflict().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::ContentNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "Content not found: 123");

        let err = DomainError::ContentTooLong { max: 512 };
        assert_eq!(err.to_string(), "Content too long: max 512 characters");

        let err = DomainError::from(ConnectionConflict::AlreadyConnected);
        assert_eq!(err.to_string(), "You are already connected");
    }
}
