//! Hashtag linker
//!
//! Keeps content <-> hashtag associations in step with descriptions. Hashtags
//! are created on first sighting and deleted as soon as nothing references
//! them.

use social_core::hashtags::extract_hashtags;
use social_core::{Content, ContentType, DomainError, Hashtag};
use tracing::{debug, instrument, warn};

use crate::dto::ContentSummaryResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const MAX_LINK_ATTEMPTS: usize = 4;

/// Hashtag linker
pub struct HashtagLinker<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> HashtagLinker<'a> {
    /// Create a new HashtagLinker
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Hashtag names in `text`, first appearance first, without duplicates
    pub fn extract_tags(text: &str) -> Vec<String> {
        extract_hashtags(text)
    }

    /// Attach every hashtag of the content's description. Names over the
    /// length limit are skipped. Returns the linked names.
    #[instrument(skip(self, content), fields(content_id = %content.id))]
    pub async fn link(&self, content: &Content) -> ServiceResult<Vec<String>> {
        let repo = self.ctx.hashtag_repo();
        let mut linked = Vec::new();

        for name in Self::extract_tags(&content.description) {
            if !Hashtag::is_valid_name(&name) {
                warn!(hashtag = %name, "Hashtag too long, skipped");
                continue;
            }

            linked.push(self.link_one(name, content).await?);
        }

        debug!(count = linked.len(), "Hashtags linked");
        Ok(linked)
    }

    /// Get-or-create then attach. An orphan cleanup can delete a fresh
    /// hashtag between the two steps; the attach then reports `false` and
    /// the pair is retried.
    async fn link_one(&self, name: String, content: &Content) -> ServiceResult<String> {
        let repo = self.ctx.hashtag_repo();

        for attempt in 1..=MAX_LINK_ATTEMPTS {
            let candidate = Hashtag::new(self.ctx.generate_id(), name.clone());
            let hashtag = repo.get_or_create(&candidate).await?;
            if repo.attach(hashtag.id, content.id).await? {
                return Ok(hashtag.name);
            }

            // already linked, as long as the row survived
            let current = repo.find_by_name(&hashtag.name).await?;
            if current.is_some_and(|row| row.id == hashtag.id) {
                return Ok(hashtag.name);
            }
            debug!(hashtag = %name, attempt, "Hashtag deleted before attach, retrying");
        }

        warn!(hashtag = %name, content_id = %content.id, "Hashtag kept vanishing before attach");
        Err(ServiceError::conflict(
            "Hashtag changed concurrently, try again",
        ))
    }

    /// Detach the hashtags of the content's current description and delete
    /// any that are left without content
    #[instrument(skip(self, content), fields(content_id = %content.id))]
    pub async fn unlink(&self, content: &Content) -> ServiceResult<()> {
        let repo = self.ctx.hashtag_repo();

        for name in Self::extract_tags(&content.description) {
            let Some(hashtag) = repo.find_by_name(&name).await? else {
                if Hashtag::is_valid_name(&name) {
                    warn!(hashtag = %name, "Hashtag in description has no row, skipped");
                }
                continue;
            };

            repo.detach(hashtag.id, content.id).await?;
            if repo.delete_if_orphaned(hashtag.id).await? {
                debug!(hashtag = %hashtag.name, "Orphaned hashtag deleted");
            }
        }

        Ok(())
    }

    /// Content carrying the hashtag `name`, newest first
    #[instrument(skip(self))]
    pub async fn contents_by_hashtag(
        &self,
        name: &str,
        content_type: Option<ContentType>,
    ) -> ServiceResult<Vec<ContentSummaryResponse>> {
        if self.ctx.hashtag_repo().find_by_name(name).await?.is_none() {
            return Err(DomainError::HashtagNotFound(name.to_string()).into());
        }

        let mut items = self
            .ctx
            .content_repo()
            .find_by_hashtags(&[name.to_string()])
            .await?;
        items.retain(|item| content_type.is_none_or(|kind| item.content.content_type() == kind));
        items.sort_by(|a, b| {
            b.content
                .created_at
                .cmp(&a.content.created_at)
                .then_with(|| b.content.id.cmp(&a.content.id))
        });

        Ok(items.iter().map(ContentSummaryResponse::from).collect())
    }
}
