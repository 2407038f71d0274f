//! Hashtag database model

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct HashtagModel {
    pub id: i64,
    pub name: String,
}
