//! In-memory implementation of HashtagRepository

use std::collections::BTreeSet;

use async_trait::async_trait;

use social_core::entities::Hashtag;
use social_core::traits::{HashtagRepository, RepoResult};
use social_core::value_objects::Snowflake;

use super::Shared;

#[derive(Clone)]
pub struct MemoryHashtagRepository {
    tables: Shared,
}

impl MemoryHashtagRepository {
    pub(super) fn new(tables: Shared) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl HashtagRepository for MemoryHashtagRepository {
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Hashtag>> {
        Ok(self
            .tables
            .read()
            .hashtags
            .values()
            .find(|h| h.name == name)
            .cloned())
    }

    async fn get_or_create(&self, candidate: &Hashtag) -> RepoResult<Hashtag> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.hashtags.values().find(|h| h.name == candidate.name) {
            return Ok(existing.clone());
        }
        tables.hashtags.insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }

    async fn attach(&self, hashtag_id: Snowflake, content_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if !tables.hashtags.contains_key(&hashtag_id) {
            return Ok(false);
        }
        Ok(tables.content_hashtags.insert((hashtag_id, content_id)))
    }

    async fn detach(&self, hashtag_id: Snowflake, content_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .write()
            .content_hashtags
            .remove(&(hashtag_id, content_id)))
    }

    async fn delete_if_orphaned(&self, hashtag_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        let in_use = tables
            .content_hashtags
            .iter()
            .any(|(h, _)| *h == hashtag_id);
        if in_use {
            return Ok(false);
        }
        Ok(tables.hashtags.remove(&hashtag_id).is_some())
    }

    async fn find_by_content(&self, content_id: Snowflake) -> RepoResult<Vec<Hashtag>> {
        let tables = self.tables.read();
        let mut tags: Vec<Hashtag> = tables
            .content_hashtags
            .iter()
            .filter(|(_, c)| *c == content_id)
            .filter_map(|(h, _)| tables.hashtags.get(h).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn content_count(&self, hashtag_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .tables
            .read()
            .content_hashtags
            .iter()
            .filter(|(h, _)| *h == hashtag_id)
            .count() as i64)
    }

    async fn liked_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<String>> {
        let tables = self.tables.read();
        let names: BTreeSet<String> = tables
            .content_likes
            .iter()
            .filter(|(_, likers)| likers.contains(&user_id))
            .flat_map(|(content_id, _)| tables.hashtag_names_of(*content_id))
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryDatabase;
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_reuses_name() {
        let repo = MemoryDatabase::new().hashtags();
        let first = repo
            .get_or_create(&Hashtag::new(Snowflake::new(1), "rust".to_string()))
            .await
            .unwrap();
        let second = repo
            .get_or_create(&Hashtag::new(Snowflake::new(2), "rust".to_string()))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, Snowflake::new(1));
    }

    #[tokio::test]
    async fn test_orphan_deletion_only_when_unused() {
        let repo = MemoryDatabase::new().hashtags();
        let tag = repo
            .get_or_create(&Hashtag::new(Snowflake::new(1), "rust".to_string()))
            .await
            .unwrap();
        repo.attach(tag.id, Snowflake::new(10)).await.unwrap();
        repo.attach(tag.id, Snowflake::new(11)).await.unwrap();
        assert_eq!(repo.content_count(tag.id).await.unwrap(), 2);

        repo.detach(tag.id, Snowflake::new(10)).await.unwrap();
        assert!(!repo.delete_if_orphaned(tag.id).await.unwrap());

        repo.detach(tag.id, Snowflake::new(11)).await.unwrap();
        assert!(repo.delete_if_orphaned(tag.id).await.unwrap());
        assert!(repo.find_by_name("rust").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attach_refuses_deleted_hashtag() {
        let repo = MemoryDatabase::new().hashtags();
        let tag = repo
            .get_or_create(&Hashtag::new(Snowflake::new(1), "rust".to_string()))
            .await
            .unwrap();
        // orphan cleanup from another content lands before the attach
        assert!(repo.delete_if_orphaned(tag.id).await.unwrap());

        assert!(!repo.attach(tag.id, Snowflake::new(10)).await.unwrap());
        assert_eq!(repo.content_count(tag.id).await.unwrap(), 0);
        assert!(repo.find_by_content(Snowflake::new(10)).await.unwrap().is_empty());
    }
}
