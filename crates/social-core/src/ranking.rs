//! Content ranking for discovery feeds
//!
//! Every function here is pure: the discovery service loads candidate
//! [`ContentDetails`] from storage and hands them over together with the
//! viewer's social signals, so all storage backends rank identically.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::entities::ContentDetails;
use crate::value_objects::Snowflake;

/// Trending and explore only consider content this recent
pub const DISCOVERY_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_EXPLORE_LIMIT: usize = 3;
pub const MAX_LIMIT: usize = 100;

pub const LIKE_WEIGHT: i64 = 2;
pub const PEER_LIKE_WEIGHT: i64 = 10;
pub const INTEREST_BONUS: i64 = 20;

/// Resolve a caller-supplied limit, clamped to `1..=MAX_LIMIT`
pub fn resolve_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

/// Oldest creation time still inside the discovery window
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(DISCOVERY_WINDOW_DAYS)
}

/// 15 for content at most a day old, 8 up to three days, 3 otherwise
pub fn recency_score(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let age = now - created_at;
    if age <= Duration::days(1) {
        15
    } else if age <= Duration::days(3) {
        8
    } else {
        3
    }
}

/// The viewer's signals that explore scoring depends on
#[derive(Debug, Clone)]
pub struct ExploreContext {
    pub viewer: Snowflake,
    /// Accepted connections of the viewer
    pub peers: HashSet<Snowflake>,
    /// Hashtags on content the viewer has liked
    pub liked_hashtags: HashSet<String>,
    pub now: DateTime<Utc>,
}

/// Explore score split into its components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub like: i64,
    pub recency: i64,
    pub social: i64,
    pub interest: i64,
}

impl ScoreBreakdown {
    #[inline]
    pub fn total(&self) -> i64 {
        self.like + self.recency + self.social + self.interest
    }
}

/// A ranked explore result
#[derive(Debug, Clone)]
pub struct ScoredContent {
    pub details: ContentDetails,
    pub score: ScoreBreakdown,
}

pub fn explore_score(details: &ContentDetails, ctx: &ExploreContext) -> ScoreBreakdown {
    let peer_likes = details
        .liked_by
        .iter()
        .filter(|user| ctx.peers.contains(user))
        .count() as i64;

    ScoreBreakdown {
        like: LIKE_WEIGHT * details.like_count() as i64,
        recency: recency_score(details.content.created_at, ctx.now),
        social: PEER_LIKE_WEIGHT * peer_likes,
        interest: if details.has_any_hashtag(&ctx.liked_hashtags) {
            INTEREST_BONUS
        } else {
            0
        },
    }
}

/// Recent, publicly owned, not the viewer's own and not already liked
pub fn is_explore_candidate(details: &ContentDetails, ctx: &ExploreContext) -> bool {
    details.content.created_at >= window_start(ctx.now)
        && details.has_discoverable_owner()
        && !details.content.is_owned_by(ctx.viewer)
        && !details.is_liked_by(ctx.viewer)
}

fn newest_first(a: &ContentDetails, b: &ContentDetails) -> Ordering {
    b.content
        .created_at
        .cmp(&a.content.created_at)
        .then_with(|| b.content.id.cmp(&a.content.id))
}

fn most_liked_first(a: &ContentDetails, b: &ContentDetails) -> Ordering {
    b.like_count()
        .cmp(&a.like_count())
        .then_with(|| newest_first(a, b))
}

fn dedup_by_id(items: &mut Vec<ContentDetails>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.content.id));
}

/// Content from the discovery window ordered by like count
pub fn trending(
    mut items: Vec<ContentDetails>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ContentDetails> {
    let since = window_start(now);
    items.retain(|item| item.content.created_at >= since);
    dedup_by_id(&mut items);
    items.sort_by(most_liked_first);
    items.truncate(limit);
    items
}

/// Hashtag-matched content the viewer neither owns nor has liked yet
pub fn related(
    mut items: Vec<ContentDetails>,
    viewer: Snowflake,
    limit: usize,
) -> Vec<ContentDetails> {
    items.retain(|item| !item.content.is_owned_by(viewer) && !item.is_liked_by(viewer));
    dedup_by_id(&mut items);
    items.sort_by(most_liked_first);
    items.truncate(limit);
    items
}

/// Peers' content, newest first
pub fn recommend(mut items: Vec<ContentDetails>, limit: usize) -> Vec<ContentDetails> {
    dedup_by_id(&mut items);
    items.sort_by(newest_first);
    items.truncate(limit);
    items
}

/// Composite explore ranking: descending total score, then newest first
pub fn explore(
    items: Vec<ContentDetails>,
    ctx: &ExploreContext,
    limit: usize,
) -> Vec<ScoredContent> {
    let mut seen = HashSet::new();
    let mut scored: Vec<ScoredContent> = items
        .into_iter()
        .filter(|details| is_explore_candidate(details, ctx))
        .filter(|details| seen.insert(details.content.id))
        .map(|details| {
            let score = explore_score(&details, ctx);
            ScoredContent { details, score }
        })
        .filter(|scored| scored.score.total() > 0)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total()
            .cmp(&a.score.total())
            .then_with(|| newest_first(&a.details, &b.details))
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Content, ContentOwner};

    const OWNER: i64 = 100;
    const VIEWER: i64 = 1;
    const PEER: i64 = 2;

    fn item(id: i64, age: Duration, now: DateTime<Utc>) -> ContentDetails {
        let mut content = Content::post(
            Snowflake::new(id),
            Snowflake::new(OWNER),
            format!("post {id}"),
            None,
        )
        .unwrap();
        content.created_at = now - age;
        content.updated_at = content.created_at;
        ContentDetails {
            content,
            owner: Some(ContentOwner {
                id: Snowflake::new(OWNER),
                username: "owner".to_string(),
                is_active: true,
                is_private: false,
            }),
            hashtags: Vec::new(),
            liked_by: Vec::new(),
        }
    }

    fn ctx(now: DateTime<Utc>) -> ExploreContext {
        ExploreContext {
            viewer: Snowflake::new(VIEWER),
            peers: HashSet::from([Snowflake::new(PEER)]),
            liked_hashtags: HashSet::from(["rust".to_string()]),
            now,
        }
    }

    #[test]
    fn test_recency_buckets() {
        let now = Utc::now();
        assert_eq!(recency_score(now - Duration::hours(2), now), 15);
        assert_eq!(recency_score(now - Duration::days(1), now), 15);
        assert_eq!(recency_score(now - Duration::days(2), now), 8);
        assert_eq!(recency_score(now - Duration::days(3), now), 8);
        assert_eq!(recency_score(now - Duration::days(5), now), 3);
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, DEFAULT_LIMIT), 20);
        assert_eq!(resolve_limit(None, DEFAULT_EXPLORE_LIMIT), 3);
        assert_eq!(resolve_limit(Some(0), DEFAULT_LIMIT), 1);
        assert_eq!(resolve_limit(Some(1_000), DEFAULT_LIMIT), MAX_LIMIT);
    }

    #[test]
    fn test_explore_score_components() {
        let now = Utc::now();
        let mut details = item(10, Duration::hours(1), now);
        details.liked_by = vec![Snowflake::new(PEER), Snowflake::new(50)];
        details.hashtags = vec!["rust".to_string()];

        let score = explore_score(&details, &ctx(now));
        assert_eq!(score.like, 4);
        assert_eq!(score.recency, 15);
        assert_eq!(score.social, 10);
        assert_eq!(score.interest, 20);
        assert_eq!(score.total(), 49);
    }

    #[test]
    fn test_peer_like_outranks_identical_candidate() {
        let now = Utc::now();
        let mut peer_liked = item(10, Duration::hours(5), now);
        peer_liked.liked_by = vec![Snowflake::new(PEER)];
        let mut stranger_liked = item(11, Duration::hours(5), now);
        stranger_liked.liked_by = vec![Snowflake::new(77)];
        // make the stranger-liked one newer so only the score can put it second
        stranger_liked.content.created_at = now - Duration::hours(1);

        let ctx = ctx(now);
        let ranked = explore(vec![stranger_liked.clone(), peer_liked.clone()], &ctx, 10);
        assert_eq!(ranked[0].details.content.id, Snowflake::new(10));
        assert!(ranked[0].score.total() - ranked[1].score.total() >= PEER_LIKE_WEIGHT);
    }

    #[test]
    fn test_explore_tie_broken_by_recency() {
        let now = Utc::now();
        let older = item(10, Duration::hours(10), now);
        let newer = item(11, Duration::hours(2), now);
        let ranked = explore(vec![older, newer], &ctx(now), 10);
        assert_eq!(ranked[0].details.content.id, Snowflake::new(11));
        assert_eq!(ranked[0].score.total(), ranked[1].score.total());
    }

    #[test]
    fn test_explore_filters_candidates() {
        let now = Utc::now();
        let ctx = ctx(now);

        let stale = item(1, Duration::days(8), now);
        let mut own = item(2, Duration::hours(1), now);
        own.content.owner_id = Some(Snowflake::new(VIEWER));
        let mut liked = item(3, Duration::hours(1), now);
        liked.liked_by = vec![Snowflake::new(VIEWER)];
        let mut private = item(4, Duration::hours(1), now);
        if let Some(owner) = private.owner.as_mut() {
            owner.is_private = true;
        }
        let mut inactive = item(5, Duration::hours(1), now);
        if let Some(owner) = inactive.owner.as_mut() {
            owner.is_active = false;
        }
        let mut orphan = item(6, Duration::hours(1), now);
        orphan.owner = None;
        orphan.content.owner_id = None;
        let fresh = item(7, Duration::days(6), now);

        let ranked = explore(
            vec![stale, own, liked, private, inactive, orphan, fresh],
            &ctx,
            10,
        );
        let ids: Vec<_> = ranked.iter().map(|s| s.details.content.id).collect();
        assert_eq!(ids, vec![Snowflake::new(7)]);
        assert_eq!(ranked[0].score.recency, 3);
    }

    #[test]
    fn test_explore_respects_limit() {
        let now = Utc::now();
        let items = (0..10).map(|i| item(i, Duration::hours(i), now)).collect();
        assert_eq!(explore(items, &ctx(now), DEFAULT_EXPLORE_LIMIT).len(), 3);
    }

    #[test]
    fn test_trending_orders_by_likes_within_window() {
        let now = Utc::now();
        let mut popular = item(1, Duration::days(2), now);
        popular.liked_by = vec![Snowflake::new(5), Snowflake::new(6)];
        let mut old_popular = item(2, Duration::days(9), now);
        old_popular.liked_by = vec![Snowflake::new(5), Snowflake::new(6), Snowflake::new(7)];
        let quiet_new = item(3, Duration::hours(1), now);
        let quiet_old = item(4, Duration::hours(3), now);

        let ranked = trending(vec![quiet_old, quiet_new, old_popular, popular], now, 10);
        let ids: Vec<_> = ranked.iter().map(|d| d.content.id.into_inner()).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_related_excludes_own_and_liked_and_dedups() {
        let now = Utc::now();
        let viewer = Snowflake::new(VIEWER);
        let mut own = item(1, Duration::hours(1), now);
        own.content.owner_id = Some(viewer);
        let mut liked = item(2, Duration::hours(1), now);
        liked.liked_by = vec![viewer];
        let other = item(3, Duration::hours(1), now);

        let ranked = related(vec![own, liked, other.clone(), other], viewer, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].content.id, Snowflake::new(3));
    }

    #[test]
    fn test_recommend_newest_first() {
        let now = Utc::now();
        let ranked = recommend(
            vec![
                item(1, Duration::days(20), now),
                item(2, Duration::hours(1), now),
                item(3, Duration::days(1), now),
            ],
            2,
        );
        let ids: Vec<_> = ranked.iter().map(|d| d.content.id.into_inner()).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
