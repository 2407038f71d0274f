//! Comment entity - text attached to content, optionally replying to another comment

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Snowflake,
    pub content_id: Snowflake,
    pub user_id: Snowflake,
    /// Parent comment; threads are one level deep
    pub reply_to: Option<Snowflake>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub const MAX_TEXT_LEN: usize = 512;

    pub fn new(
        id: Snowflake,
        content_id: Snowflake,
        user_id: Snowflake,
        reply_to: Option<Snowflake>,
        text: String,
    ) -> Result<Self, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Comment text is required".to_string(),
            ));
        }
        if text.chars().count() > Self::MAX_TEXT_LEN {
            return Err(DomainError::ContentTooLong {
                max: Self::MAX_TEXT_LEN,
            });
        }

        Ok(Self {
            id,
            content_id,
            user_id,
            reply_to,
            text,
            created_at: Utc::now(),
        })
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    #[inline]
    pub fn is_authored_by(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }
}

/// Comment with its author's name and aggregate counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDetails {
    pub comment: Comment,
    pub author_username: String,
    pub reply_count: i64,
    pub like_count: i64,
}
