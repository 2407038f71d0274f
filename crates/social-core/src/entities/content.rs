//! Content entity - posts and media items that users publish

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Kind of media attached to a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(DomainError::InvalidMedia(format!(
                "media_type must be video or audio, got {other:?}"
            ))),
        }
    }
}

/// Variant-specific payload of a content item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Post,
    Media { file: String, media_type: MediaType },
}

/// Discriminant of [`ContentKind`], used to filter listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Media,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Media => "media",
        }
    }
}

impl ContentKind {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Post => ContentType::Post,
            Self::Media { .. } => ContentType::Media,
        }
    }
}

/// A post or media item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub id: Snowflake,
    /// `None` once the owner account has been removed
    pub owner_id: Option<Snowflake>,
    pub kind: ContentKind,
    pub description: String,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    pub const MAX_DESCRIPTION_LEN: usize = 512;

    /// Create a text post
    pub fn post(
        id: Snowflake,
        owner_id: Snowflake,
        description: String,
        thumbnail: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::build(id, owner_id, ContentKind::Post, description, thumbnail)
    }

    /// Create a media item. The file reference must be non-empty.
    pub fn media(
        id: Snowflake,
        owner_id: Snowflake,
        description: String,
        file: String,
        media_type: MediaType,
        thumbnail: Option<String>,
    ) -> Result<Self, DomainError> {
        if file.trim().is_empty() {
            return Err(DomainError::InvalidMedia(
                "A media file must be provided".to_string(),
            ));
        }

        Self::build(
            id,
            owner_id,
            ContentKind::Media { file, media_type },
            description,
            thumbnail,
        )
    }

    fn build(
        id: Snowflake,
        owner_id: Snowflake,
        kind: ContentKind,
        description: String,
        thumbnail: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_description(&description)?;
        let now = Utc::now();
        Ok(Self {
            id,
            owner_id: Some(owner_id),
            kind,
            description,
            thumbnail,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_description(description: &str) -> Result<(), DomainError> {
        if description.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Description is required".to_string(),
            ));
        }
        if description.chars().count() > Self::MAX_DESCRIPTION_LEN {
            return Err(DomainError::ContentTooLong {
                max: Self::MAX_DESCRIPTION_LEN,
            });
        }
        Ok(())
    }

    /// Replace the description, bumping `updated_at`
    pub fn set_description(&mut self, description: String) -> Result<(), DomainError> {
        Self::validate_description(&description)?;
        self.description = description;
        self.updated_at = Utc::now();
        Ok(())
    }

    #[inline]
    pub fn content_type(&self) -> ContentType {
        self.kind.content_type()
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Owner fields denormalized onto content listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOwner {
    pub id: Snowflake,
    pub username: String,
    pub is_active: bool,
    pub is_private: bool,
}

/// Content with everything discovery and presentation need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDetails {
    pub content: Content,
    pub owner: Option<ContentOwner>,
    pub hashtags: Vec<String>,
    pub liked_by: Vec<Snowflake>,
}

impl ContentDetails {
    #[inline]
    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }

    pub fn is_liked_by(&self, user_id: Snowflake) -> bool {
        self.liked_by.contains(&user_id)
    }

    pub fn owner_username(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.username.as_str())
    }

    /// Owner exists, is active and has a public profile
    pub fn has_discoverable_owner(&self) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|o| o.is_active && !o.is_private)
    }

    pub fn has_any_hashtag(&self, names: &HashSet<String>) -> bool {
        self.hashtags.iter().any(|tag| names.contains(tag))
    }
}
