//! Content entity <-> model mapper
//!
//! The `Post`/`Media` variants share one table; `content_type` is the
//! discriminant and the media columns are NULL for posts.

use social_core::entities::{
    Content, ContentDetails, ContentKind, ContentOwner, ContentType, MediaType,
};
use social_core::error::DomainError;
use social_core::value_objects::Snowflake;

use crate::models::{ContentDetailsModel, ContentModel};

fn corrupt(id: i64, what: &str) -> DomainError {
    DomainError::DatabaseError(format!("Malformed content row {id}: {what}"))
}

impl TryFrom<ContentModel> for Content {
    type Error = DomainError;

    fn try_from(model: ContentModel) -> Result<Self, Self::Error> {
        let kind = match model.content_type.as_str() {
            "post" => ContentKind::Post,
            "media" => {
                let file = model
                    .file
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| corrupt(model.id, "media without file"))?;
                let media_type: MediaType = model
                    .media_type
                    .as_deref()
                    .ok_or_else(|| corrupt(model.id, "media without media_type"))?
                    .parse()
                    .map_err(|_| corrupt(model.id, "unknown media_type"))?;
                ContentKind::Media { file, media_type }
            }
            other => return Err(corrupt(model.id, &format!("unknown content_type {other:?}"))),
        };

        Ok(Content {
            id: Snowflake::new(model.id),
            owner_id: model.owner_id.map(Snowflake::new),
            kind,
            description: model.description,
            thumbnail: model.thumbnail,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<ContentDetailsModel> for ContentDetails {
    type Error = DomainError;

    fn try_from(model: ContentDetailsModel) -> Result<Self, Self::Error> {
        let owner = match (
            model.content.owner_id,
            model.owner_username,
            model.owner_is_active,
            model.owner_is_private,
        ) {
            (Some(id), Some(username), Some(is_active), Some(is_private)) => Some(ContentOwner {
                id: Snowflake::new(id),
                username,
                is_active,
                is_private,
            }),
            _ => None,
        };

        Ok(ContentDetails {
            content: Content::try_from(model.content)?,
            owner,
            hashtags: model.hashtags,
            liked_by: model.liked_by.into_iter().map(Snowflake::new).collect(),
        })
    }
}

/// Content flattened into table columns
pub struct ContentColumns<'a> {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub content_type: &'static str,
    pub description: &'a str,
    pub thumbnail: Option<&'a str>,
    pub file: Option<&'a str>,
    pub media_type: Option<&'static str>,
}

impl<'a> ContentColumns<'a> {
    pub fn new(content: &'a Content) -> Self {
        let (file, media_type) = match &content.kind {
            ContentKind::Post => (None, None),
            ContentKind::Media { file, media_type } => (Some(file.as_str()), Some(media_type.as_str())),
        };

        Self {
            id: content.id.into_inner(),
            owner_id: content.owner_id.map(Snowflake::into_inner),
            content_type: content.content_type().as_str(),
            description: &content.description,
            thumbnail: content.thumbnail.as_deref(),
            file,
            media_type,
        }
    }
}

/// Database value of a content type filter
pub(crate) fn content_type_filter(content_type: Option<ContentType>) -> Option<&'static str> {
    content_type.map(|t| t.as_str())
}
