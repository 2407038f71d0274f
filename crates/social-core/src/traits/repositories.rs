//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Comment, CommentDetails, Connection, Content, ContentDetails, ContentType, Hashtag, User,
};
use crate::error::DomainError;
use crate::search;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by exact username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Load several users at once; unknown ids are skipped
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    /// Create a new user. Fails with a conflict on duplicate username/email.
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Update an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()>;
}

// ============================================================================
// Connection Repository
// ============================================================================

/// Storage for connection edges.
///
/// At most one row exists per unordered pair of users. The read methods treat
/// `(a, b)` and `(b, a)` alike unless they name a direction. Each write is
/// atomic on its own; the connection service composes them.
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// The single edge for the unordered pair, if any
    async fn edge_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Connection>>;

    /// Incoming pending requests awaiting `user`'s decision
    async fn pending_for(&self, user: Snowflake) -> RepoResult<Vec<Connection>>;

    /// Outgoing pending requests sent by `user`
    async fn sent_by(&self, user: Snowflake) -> RepoResult<Vec<Connection>>;

    /// Ids of every user with an accepted connection to `user`
    async fn accepted_peers(&self, user: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Whether an accepted edge exists in either direction
    async fn is_connected(&self, a: Snowflake, b: Snowflake) -> RepoResult<bool>;

    /// Number of accepted connections of `user`
    async fn count_peers(&self, user: Snowflake) -> RepoResult<i64>;

    /// Insert keyed on the canonical pair.
    /// Returns `false` when a row for the pair already exists.
    async fn insert_if_absent(&self, connection: &Connection) -> RepoResult<bool>;

    /// Flip the pending `requester -> receiver` edge to accepted.
    /// Returns `false` if no such pending edge exists.
    async fn accept_pending(&self, requester: Snowflake, receiver: Snowflake) -> RepoResult<bool>;

    /// Delete the pending `requester -> receiver` edge
    async fn delete_pending(&self, requester: Snowflake, receiver: Snowflake) -> RepoResult<bool>;

    /// Delete whatever edge exists for the unordered pair
    async fn delete_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Content Repository
// ============================================================================

/// Filters for [`ContentRepository::search`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSearch {
    /// Fuzzy description match, see [`crate::search`]
    pub query: Option<String>,
    pub content_type: Option<ContentType>,
    /// Case-insensitive hashtag name
    pub hashtag: Option<String>,
}

impl ContentSearch {
    pub fn matches(&self, details: &ContentDetails) -> bool {
        if let Some(kind) = self.content_type {
            if details.content.content_type() != kind {
                return false;
            }
        }
        if let Some(query) = &self.query {
            if !search::is_similar(&details.content.description, query) {
                return false;
            }
        }
        if let Some(tag) = &self.hashtag {
            let tag = tag.to_lowercase();
            if !details.hashtags.iter().any(|t| t.to_lowercase() == tag) {
                return false;
            }
        }
        true
    }

    /// Similarity to the query; `0.0` without one
    pub fn relevance(&self, details: &ContentDetails) -> f64 {
        self.query.as_deref().map_or(0.0, |query| {
            search::trigram_similarity(&details.content.description, query)
        })
    }
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Content>>;

    /// Content with owner, hashtags and likers
    async fn find_details(&self, id: Snowflake) -> RepoResult<Option<ContentDetails>>;

    /// Content owned by `owner_id`, newest first
    async fn find_by_owner(
        &self,
        owner_id: Snowflake,
        content_type: Option<ContentType>,
    ) -> RepoResult<Vec<ContentDetails>>;

    async fn create(&self, content: &Content) -> RepoResult<()>;

    /// Persist description/thumbnail changes
    async fn update(&self, content: &Content) -> RepoResult<()>;

    /// Delete content together with its likes, comments and hashtag links
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;

    /// Add `user_id` to the like-set. Returns whether the set changed.
    async fn add_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Remove `user_id` from the like-set. Returns whether the set changed.
    async fn remove_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    async fn has_liked(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Flip the like in one atomic step and return the new state.
    /// Concurrent toggles by the same user apply one after another.
    async fn toggle_like(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Content created at or after `since`
    async fn find_recent(&self, since: DateTime<Utc>) -> RepoResult<Vec<ContentDetails>>;

    /// Content owned by any of `owner_ids`, newest first
    async fn find_by_owners(&self, owner_ids: &[Snowflake]) -> RepoResult<Vec<ContentDetails>>;

    /// Content carrying any hashtag in `names` (exact match)
    async fn find_by_hashtags(&self, names: &[String]) -> RepoResult<Vec<ContentDetails>>;

    /// Filtered listing, most similar to the query first, then newest first
    async fn search(&self, filter: &ContentSearch) -> RepoResult<Vec<ContentDetails>>;
}

// ============================================================================
// Hashtag Repository
// ============================================================================

#[async_trait]
pub trait HashtagRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Hashtag>>;

    /// Return the stored hashtag named `candidate.name`, inserting `candidate`
    /// if none exists yet
    async fn get_or_create(&self, candidate: &Hashtag) -> RepoResult<Hashtag>;

    /// Associate a hashtag with content. Returns whether a link was added;
    /// `false` when the link already exists or the hashtag row is gone.
    async fn attach(&self, hashtag_id: Snowflake, content_id: Snowflake) -> RepoResult<bool>;

    /// Remove the association. Returns whether a link was removed.
    async fn detach(&self, hashtag_id: Snowflake, content_id: Snowflake) -> RepoResult<bool>;

    /// Delete the hashtag if it has no associated content left
    async fn delete_if_orphaned(&self, hashtag_id: Snowflake) -> RepoResult<bool>;

    /// Hashtags attached to `content_id`
    async fn find_by_content(&self, content_id: Snowflake) -> RepoResult<Vec<Hashtag>>;

    /// Number of content items associated with the hashtag
    async fn content_count(&self, hashtag_id: Snowflake) -> RepoResult<i64>;

    /// Names of hashtags attached to content liked by `user_id`
    async fn liked_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<String>>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>>;

    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    /// Delete a comment and its replies
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;

    /// Top-level comments on content, oldest first
    async fn list_top_level(&self, content_id: Snowflake) -> RepoResult<Vec<CommentDetails>>;

    /// Replies to a comment, oldest first
    async fn list_replies(&self, comment_id: Snowflake) -> RepoResult<Vec<CommentDetails>>;

    async fn add_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    async fn remove_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    async fn has_liked(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Atomic flip, see [`ContentRepository::toggle_like`]
    async fn toggle_like(&self, comment_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;
}
