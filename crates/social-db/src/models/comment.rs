//! Comment database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub content_id: i64,
    pub user_id: i64,
    pub reply_to: Option<i64>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Comment with author name and aggregate counts
#[derive(Debug, Clone, FromRow)]
pub struct CommentDetailsModel {
    #[sqlx(flatten)]
    pub comment: CommentModel,
    pub author_username: String,
    pub reply_count: i64,
    pub like_count: i64,
}
