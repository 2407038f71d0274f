//! Canonical unordered pair of users
//!
//! Connections are stored directed (requester -> receiver) but at most one row
//! may exist per pair of users. `UserPair` is the key that makes `(a, b)` and
//! `(b, a)` collide.

use super::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserPair {
    low: Snowflake,
    high: Snowflake,
}

impl UserPair {
    pub fn new(a: Snowflake, b: Snowflake) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[inline]
    pub fn low(&self) -> Snowflake {
        self.low
    }

    #[inline]
    pub fn high(&self) -> Snowflake {
        self.high
    }

    pub fn contains(&self, user: Snowflake) -> bool {
        self.low == user || self.high == user
    }

    /// The member of the pair that is not `user`, if `user` belongs to it
    pub fn other(&self, user: Snowflake) -> Option<Snowflake> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}
