//! Connection entity - a directed friendship request between two users

use chrono::{DateTime, Utc};

use crate::value_objects::{Snowflake, UserPair};

/// Lifecycle state of the row for a user pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Pending,
    Accepted,
}

/// Directed connection edge. Once accepted it is an undirected friendship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub requester: Snowflake,
    pub receiver: Snowflake,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(requester: Snowflake, receiver: Snowflake, accepted: bool) -> Self {
        Self {
            requester,
            receiver,
            accepted,
            created_at: Utc::now(),
        }
    }

    /// Canonical key shared by both directions
    #[inline]
    pub fn pair(&self) -> UserPair {
        UserPair::new(self.requester, self.receiver)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.accepted
    }

    pub fn state(&self) -> ConnectionState {
        if self.accepted {
            ConnectionState::Accepted
        } else {
            ConnectionState::Pending
        }
    }

    /// Whether the edge points exactly `requester -> receiver`
    pub fn is_directed(&self, requester: Snowflake, receiver: Snowflake) -> bool {
        self.requester == requester && self.receiver == receiver
    }

    /// The other side of the edge as seen from `user`
    pub fn peer_of(&self, user: Snowflake) -> Option<Snowflake> {
        self.pair().other(user)
    }
}
