//! In-memory implementation of ConnectionRepository
//!
//! Rows are keyed by [`UserPair`], so a request and its reverse share a slot.

use std::collections::hash_map::Entry;

use async_trait::async_trait;

use social_core::entities::Connection;
use social_core::traits::{ConnectionRepository, RepoResult};
use social_core::value_objects::{Snowflake, UserPair};

use super::Shared;

#[derive(Clone)]
pub struct MemoryConnectionRepository {
    tables: Shared,
}

impl MemoryConnectionRepository {
    pub(super) fn new(tables: Shared) -> Self {
        Self { tables }
    }

    fn pending_where(&self, pred: impl Fn(&Connection) -> bool) -> Vec<Connection> {
        let tables = self.tables.read();
        let mut rows: Vec<Connection> = tables
            .connections
            .values()
            .filter(|c| c.is_pending() && pred(c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl ConnectionRepository for MemoryConnectionRepository {
    async fn edge_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Connection>> {
        Ok(self
            .tables
            .read()
            .connections
            .get(&UserPair::new(a, b))
            .cloned())
    }

    async fn pending_for(&self, user: Snowflake) -> RepoResult<Vec<Connection>> {
        Ok(self.pending_where(|c| c.receiver == user))
    }

    async fn sent_by(&self, user: Snowflake) -> RepoResult<Vec<Connection>> {
        Ok(self.pending_where(|c| c.requester == user))
    }

    async fn accepted_peers(&self, user: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .tables
            .read()
            .connections
            .values()
            .filter(|c| c.accepted)
            .filter_map(|c| c.peer_of(user))
            .collect())
    }

    async fn is_connected(&self, a: Snowflake, b: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .read()
            .connections
            .get(&UserPair::new(a, b))
            .is_some_and(|c| c.accepted))
    }

    async fn count_peers(&self, user: Snowflake) -> RepoResult<i64> {
        Ok(self.accepted_peers(user).await?.len() as i64)
    }

    async fn insert_if_absent(&self, connection: &Connection) -> RepoResult<bool> {
        match self.tables.write().connections.entry(connection.pair()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(connection.clone());
                Ok(true)
            }
        }
    }

    async fn accept_pending(&self, requester: Snowflake, receiver: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        match tables.connections.get_mut(&UserPair::new(requester, receiver)) {
            Some(row) if row.is_pending() && row.is_directed(requester, receiver) => {
                row.accepted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending(&self, requester: Snowflake, receiver: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        let pair = UserPair::new(requester, receiver);
        let matches = tables
            .connections
            .get(&pair)
            .is_some_and(|row| row.is_pending() && row.is_directed(requester, receiver));
        if matches {
            tables.connections.remove(&pair);
        }
        Ok(matches)
    }

    async fn delete_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .write()
            .connections
            .remove(&UserPair::new(a, b))
            .is_some())
    }
}
