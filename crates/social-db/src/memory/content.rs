//! In-memory implementation of ContentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use social_core::entities::{Content, ContentDetails, ContentType};
use social_core::error::DomainError;
use social_core::traits::{ContentRepository, ContentSearch, RepoResult};
use social_core::value_objects::Snowflake;

use super::Shared;

#[derive(Clone)]
pub struct MemoryContentRepository {
    tables: Shared,
}

impl MemoryContentRepository {
    pub(super) fn new(tables: Shared) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Content>> {
        Ok(self.tables.read().contents.get(&id).cloned())
    }

    async fn find_details(&self, id: Snowflake) -> RepoResult<Option<ContentDetails>> {
        let tables = self.tables.read();
        Ok(tables.contents.get(&id).map(|content| tables.details(content)))
    }

    async fn find_by_owner(
        &self,
        owner_id: Snowflake,
        content_type: Option<ContentType>,
    ) -> RepoResult<Vec<ContentDetails>> {
        Ok(self.tables.read().details_where(|c| {
            c.is_owned_by(owner_id) && content_type.is_none_or(|t| c.content_type() == t)
        }))
    }

    async fn create(&self, content: &Content) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if tables.contents.contains_key(&content.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate content id {}",
                content.id
            )));
        }
        tables.contents.insert(content.id, content.clone());
        Ok(())
    }

    async fn update(&self, content: &Content) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let stored = tables
            .contents
            .get_mut(&content.id)
            .ok_or(DomainError::ContentNotFound(content.id))?;
        stored.description.clone_from(&content.description);
        stored.thumbnail.clone_from(&content.thumbnail);
        stored.updated_at = content.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if tables.contents.remove(&id).is_none() {
            return Ok(false);
        }
        tables.content_likes.remove(&id);
        tables.content_hashtags.retain(|(_, content)| *content != id);
        let comments: Vec<Snowflake> = tables
            .comments
            .values()
            .filter(|c| c.content_id == id && c.reply_to.is_none())
            .map(|c| c.id)
            .collect();
        for comment in comments {
            tables.remove_comment_tree(comment);
        }
        Ok(true)
    }

    async fn add_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if !tables.contents.contains_key(&content_id) {
            return Err(DomainError::ContentNotFound(content_id));
        }
        let likers = tables.content_likes.entry(content_id).or_default();
        if likers.contains(&user_id) {
            return Ok(false);
        }
        likers.push(user_id);
        Ok(true)
    }

    async fn remove_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        let Some(likers) = tables.content_likes.get_mut(&content_id) else {
            return Ok(false);
        };
        let before = likers.len();
        likers.retain(|u| *u != user_id);
        Ok(likers.len() != before)
    }

    async fn toggle_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if !tables.contents.contains_key(&content_id) {
            return Err(DomainError::ContentNotFound(content_id));
        }
        let likers = tables.content_likes.entry(content_id).or_default();
        if let Some(pos) = likers.iter().position(|u| *u == user_id) {
            likers.remove(pos);
            return Ok(false);
        }
        likers.push(user_id);
        Ok(true)
    }

    async fn has_liked(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .read()
            .content_likes
            .get(&content_id)
            .is_some_and(|likers| likers.contains(&user_id)))
    }

    async fn find_recent(&self, since: DateTime<Utc>) -> RepoResult<Vec<ContentDetails>> {
        Ok(self.tables.read().details_where(|c| c.created_at >= since))
    }

    async fn find_by_owners(&self, owner_ids: &[Snowflake]) -> RepoResult<Vec<ContentDetails>> {
        Ok(self
            .tables
            .read()
            .details_where(|c| c.owner_id.is_some_and(|owner| owner_ids.contains(&owner))))
    }

    async fn find_by_hashtags(&self, names: &[String]) -> RepoResult<Vec<ContentDetails>> {
        let tables = self.tables.read();
        Ok(tables.details_where(|c| {
            tables
                .hashtag_names_of(c.id)
                .iter()
                .any(|name| names.contains(name))
        }))
    }

    async fn search(&self, filter: &ContentSearch) -> RepoResult<Vec<ContentDetails>> {
        let mut items = self.tables.read().details_where(|_| true);
        items.retain(|details| filter.matches(details));
        // stable sort keeps newest-first among equal scores
        items.sort_by(|a, b| filter.relevance(b).total_cmp(&filter.relevance(a)));
        Ok(items)
    }
}
