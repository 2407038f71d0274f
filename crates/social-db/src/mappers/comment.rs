//! Comment entity <-> model mapper

use social_core::entities::{Comment, CommentDetails};
use social_core::value_objects::Snowflake;

use crate::models::{CommentDetailsModel, CommentModel};

impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        Comment {
            id: Snowflake::new(model.id),
            content_id: Snowflake::new(model.content_id),
            user_id: Snowflake::new(model.user_id),
            reply_to: model.reply_to.map(Snowflake::new),
            text: model.text,
            created_at: model.created_at,
        }
    }
}

impl From<CommentDetailsModel> for CommentDetails {
    fn from(model: CommentDetailsModel) -> Self {
        CommentDetails {
            comment: Comment::from(model.comment),
            author_username: model.author_username,
            reply_count: model.reply_count,
            like_count: model.like_count,
        }
    }
}
