//! Content database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the contents table
#[derive(Debug, Clone, FromRow)]
pub struct ContentModel {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub content_type: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub file: Option<String>,
    pub media_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content joined with its owner, hashtag names and likers
#[derive(Debug, Clone, FromRow)]
pub struct ContentDetailsModel {
    #[sqlx(flatten)]
    pub content: ContentModel,
    pub owner_username: Option<String>,
    pub owner_is_active: Option<bool>,
    pub owner_is_private: Option<bool>,
    pub hashtags: Vec<String>,
    pub liked_by: Vec<i64>,
}
