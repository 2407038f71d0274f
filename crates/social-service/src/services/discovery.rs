//! Discovery service
//!
//! Loads candidates and the viewer's social signals, then hands them to
//! [`social_core::ranking`] for ordering.

use std::collections::HashSet;

use chrono::Utc;
use social_core::ranking::{self, ExploreContext, DEFAULT_EXPLORE_LIMIT, DEFAULT_LIMIT};
use social_core::Snowflake;
use tracing::{debug, instrument};

use crate::dto::ContentSummaryResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Discovery service
pub struct DiscoveryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DiscoveryService<'a> {
    /// Create a new DiscoveryService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Most liked content of the last seven days
    #[instrument(skip(self))]
    pub async fn trending(&self, limit: Option<usize>) -> ServiceResult<Vec<ContentSummaryResponse>> {
        let now = Utc::now();
        let items = self
            .ctx
            .content_repo()
            .find_recent(ranking::window_start(now))
            .await?;

        let ranked = ranking::trending(items, now, ranking::resolve_limit(limit, DEFAULT_LIMIT));
        Ok(ranked.iter().map(ContentSummaryResponse::from).collect())
    }

    /// Content sharing a hashtag with something the user liked
    #[instrument(skip(self))]
    pub async fn related(
        &self,
        user_id: Snowflake,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<ContentSummaryResponse>> {
        let tags = self.ctx.hashtag_repo().liked_by_user(user_id).await?;
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.ctx.content_repo().find_by_hashtags(&tags).await?;
        let ranked = ranking::related(items, user_id, ranking::resolve_limit(limit, DEFAULT_LIMIT));
        Ok(ranked.iter().map(ContentSummaryResponse::from).collect())
    }

    /// Newest content from the user's connections
    #[instrument(skip(self))]
    pub async fn recommend(
        &self,
        user_id: Snowflake,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<ContentSummaryResponse>> {
        let peers = self.ctx.connection_repo().accepted_peers(user_id).await?;
        if peers.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.ctx.content_repo().find_by_owners(&peers).await?;
        let ranked = ranking::recommend(items, ranking::resolve_limit(limit, DEFAULT_LIMIT));
        Ok(ranked.iter().map(ContentSummaryResponse::from).collect())
    }

    /// Composite feed scored on likes, recency, peer likes and interests
    #[instrument(skip(self))]
    pub async fn explore(
        &self,
        user_id: Snowflake,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<ContentSummaryResponse>> {
        let now = Utc::now();
        let peers: HashSet<Snowflake> = self
            .ctx
            .connection_repo()
            .accepted_peers(user_id)
            .await?
            .into_iter()
            .collect();
        let liked_hashtags: HashSet<String> = self
            .ctx
            .hashtag_repo()
            .liked_by_user(user_id)
            .await?
            .into_iter()
            .collect();

        let items = self
            .ctx
            .content_repo()
            .find_recent(ranking::window_start(now))
            .await?;
        debug!(
            candidates = items.len(),
            peers = peers.len(),
            interests = liked_hashtags.len(),
            "Explore inputs loaded"
        );

        let context = ExploreContext {
            viewer: user_id,
            peers,
            liked_hashtags,
            now,
        };
        let ranked = ranking::explore(
            items,
            &context,
            ranking::resolve_limit(limit, DEFAULT_EXPLORE_LIMIT),
        );
        Ok(ranked.into_iter().map(ContentSummaryResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CreatePostRequest, RegisterRequest};
    use crate::services::{AccountService, ConnectionService, ContentService, LikeService, UserService};
    use social_db::MemoryDatabase;

    struct Fixture {
        ctx: ServiceContext,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ctx: ServiceContext::in_memory(&MemoryDatabase::new()),
            }
        }

        async fn user(&self, username: &str) -> Snowflake {
            let user = AccountService::new(&self.ctx)
                .register(RegisterRequest {
                    username: username.to_string(),
                    email: None,
                    password: "Secret123".to_string(),
                })
                .await
                .unwrap();
            Snowflake::parse(&user.id).unwrap()
        }

        async fn post(&self, owner: Snowflake, description: &str) -> Snowflake {
            let summary = ContentService::new(&self.ctx)
                .create_post(
                    owner,
                    CreatePostRequest {
                        description: description.to_string(),
                        thumbnail: None,
                    },
                )
                .await
                .unwrap();
            Snowflake::parse(&summary.id).unwrap()
        }

        async fn like(&self, user: Snowflake, content: Snowflake) {
            LikeService::new(&self.ctx).like(user, content).await.unwrap();
        }

        fn discovery(&self) -> DiscoveryService<'_> {
            DiscoveryService::new(&self.ctx)
        }
    }

    fn ids(items: &[ContentSummaryResponse]) -> Vec<String> {
        items.iter().map(|item| item.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_trending_orders_by_likes() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let carol = fx.user("carol").await;

        let quiet = fx.post(alice, "quiet").await;
        let popular = fx.post(alice, "popular").await;
        fx.like(bob, popular).await;
        fx.like(carol, popular).await;
        fx.like(bob, quiet).await;

        let trending = fx.discovery().trending(None).await.unwrap();
        assert_eq!(ids(&trending), vec![popular.to_string(), quiet.to_string()]);
        assert_eq!(trending[0].like_count, 2);

        let capped = fx.discovery().trending(Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
        // zero clamps to one
        assert_eq!(fx.discovery().trending(Some(0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_related_uses_liked_hashtags() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;

        let liked = fx.post(bob, "#hiking trip").await;
        let related = fx.post(bob, "more #hiking").await;
        let own = fx.post(alice, "my #hiking").await;
        fx.post(bob, "#cooking").await;
        fx.like(alice, liked).await;

        let items = fx.discovery().related(alice, None).await.unwrap();
        assert_eq!(ids(&items), vec![related.to_string()]);
        assert!(!ids(&items).contains(&own.to_string()));

        let stranger = fx.user("carol").await;
        assert!(fx.discovery().related(stranger, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recommend_shows_peers_content() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let carol = fx.user("carol").await;

        ConnectionService::new(&fx.ctx)
            .request_connection(alice, bob)
            .await
            .unwrap();
        let older = fx.post(bob, "first").await;
        let newer = fx.post(bob, "second").await;
        fx.post(carol, "not a peer").await;

        let items = fx.discovery().recommend(alice, None).await.unwrap();
        assert_eq!(ids(&items), vec![newer.to_string(), older.to_string()]);
    }

    #[tokio::test]
    async fn test_explore_prefers_peer_likes() {
        let fx = Fixture::new();
        let viewer = fx.user("viewer").await;
        let peer = fx.user("peer").await;
        let stranger = fx.user("stranger").await;
        let owner = fx.user("owner").await;

        ConnectionService::new(&fx.ctx)
            .request_connection(viewer, peer)
            .await
            .unwrap();

        let by_peer = fx.post(owner, "liked by a peer").await;
        let by_stranger = fx.post(owner, "liked by a stranger").await;
        fx.like(peer, by_peer).await;
        fx.like(stranger, by_stranger).await;

        let feed = fx.discovery().explore(viewer, Some(10)).await.unwrap();
        assert_eq!(ids(&feed)[0], by_peer.to_string());
        let first = feed[0].score.unwrap();
        let second = feed[1].score.unwrap();
        assert!(first - second >= 10);
    }

    #[tokio::test]
    async fn test_explore_skips_own_liked_and_private() {
        let fx = Fixture::new();
        let viewer = fx.user("viewer").await;
        let owner = fx.user("owner").await;
        let hidden = fx.user("hidden").await;

        fx.post(viewer, "mine").await;
        let liked = fx.post(owner, "already liked").await;
        fx.like(viewer, liked).await;
        fx.post(hidden, "private account").await;
        UserService::new(&fx.ctx).set_private(hidden, true).await.unwrap();
        let visible = fx.post(owner, "visible").await;

        let feed = fx.discovery().explore(viewer, None).await.unwrap();
        assert_eq!(ids(&feed), vec![visible.to_string()]);
    }
}
