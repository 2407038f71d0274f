//! Table storage shared by the in-memory repositories

use std::collections::{BTreeSet, HashMap, HashSet};

use social_core::entities::{Comment, Connection, Content, ContentDetails, ContentOwner, Hashtag, User};
use social_core::value_objects::{Snowflake, UserPair};

pub(super) struct UserRow {
    pub user: User,
    pub password_hash: String,
}

#[derive(Default)]
pub(super) struct Tables {
    pub users: HashMap<Snowflake, UserRow>,
    pub connections: HashMap<UserPair, Connection>,
    pub contents: HashMap<Snowflake, Content>,
    /// content id -> likers in like order
    pub content_likes: HashMap<Snowflake, Vec<Snowflake>>,
    pub hashtags: HashMap<Snowflake, Hashtag>,
    /// (hashtag id, content id)
    pub content_hashtags: BTreeSet<(Snowflake, Snowflake)>,
    pub comments: HashMap<Snowflake, Comment>,
    /// (comment id, user id)
    pub comment_likes: HashSet<(Snowflake, Snowflake)>,
}

impl Tables {
    pub fn user_by(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .values()
            .map(|row| &row.user)
            .find(|user| pred(user))
            .cloned()
    }

    pub fn hashtag_names_of(&self, content_id: Snowflake) -> Vec<String> {
        let mut names: Vec<String> = self
            .content_hashtags
            .iter()
            .filter(|(_, c)| *c == content_id)
            .filter_map(|(h, _)| self.hashtags.get(h))
            .map(|h| h.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn details(&self, content: &Content) -> ContentDetails {
        let owner = content
            .owner_id
            .and_then(|id| self.users.get(&id))
            .map(|row| ContentOwner {
                id: row.user.id,
                username: row.user.username.clone(),
                is_active: row.user.is_active,
                is_private: row.user.is_private,
            });

        ContentDetails {
            content: content.clone(),
            owner,
            hashtags: self.hashtag_names_of(content.id),
            liked_by: self
                .content_likes
                .get(&content.id)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Details of every content matching `pred`, newest first
    pub fn details_where(&self, pred: impl Fn(&Content) -> bool) -> Vec<ContentDetails> {
        let mut items: Vec<ContentDetails> = self
            .contents
            .values()
            .filter(|content| pred(content))
            .map(|content| self.details(content))
            .collect();
        items.sort_by(|a, b| {
            b.content
                .created_at
                .cmp(&a.content.created_at)
                .then_with(|| b.content.id.cmp(&a.content.id))
        });
        items
    }

    /// Remove a comment together with its replies and all their likes
    pub fn remove_comment_tree(&mut self, id: Snowflake) -> bool {
        if self.comments.remove(&id).is_none() {
            return false;
        }
        let replies: Vec<Snowflake> = self
            .comments
            .values()
            .filter(|c| c.reply_to == Some(id))
            .map(|c| c.id)
            .collect();
        for reply in replies {
            self.remove_comment_tree(reply);
        }
        self.comment_likes.retain(|(comment, _)| *comment != id);
        true
    }
}
