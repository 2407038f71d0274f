//! Connection service
//!
//! Request/accept/reject/remove state machine over the connection graph.
//!
//! Per unordered pair of users the states are `NONE -> PENDING -> ACCEPTED`,
//! with `PENDING -> NONE` on reject and `ACCEPTED -> NONE` on remove. A request
//! that meets a pending request in the opposite direction accepts that row in
//! place instead of creating a second one.

use std::collections::HashMap;

use social_core::{Connection, ConnectionConflict, DomainError, Snowflake, User};
use tracing::{debug, info, instrument, warn};

use crate::dto::{ConnectionRequestResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::user::UserService;

/// Read/decide/write rounds before a request gives up on a contended pair
const MAX_REQUEST_ATTEMPTS: usize = 8;

/// Connection service
pub struct ConnectionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConnectionService<'a> {
    /// Create a new ConnectionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn users(&self) -> UserService<'a> {
        UserService::new(self.ctx)
    }

    /// Ask `receiver` to connect.
    ///
    /// Public receivers are connected immediately (`ok`), private ones get a
    /// pending request. A pending request from `receiver` to `requester` is
    /// accepted in place, whatever the receiver's privacy.
    ///
    /// The decision is re-taken whenever an insert or accept loses a race, so
    /// the pair never ends up with two rows.
    #[instrument(skip(self))]
    pub async fn request_connection(
        &self,
        requester: Snowflake,
        receiver: Snowflake,
    ) -> ServiceResult<ConnectionRequestResponse> {
        if requester == receiver {
            return Err(DomainError::from(ConnectionConflict::SelfConnection).into());
        }

        self.users().get_user_entity(requester).await?;
        let receiver_user = self.users().get_user_entity(receiver).await?;
        let repo = self.ctx.connection_repo();

        for attempt in 1..=MAX_REQUEST_ATTEMPTS {
            match repo.edge_between(requester, receiver).await? {
                Some(edge) if edge.is_directed(requester, receiver) => {
                    let conflict = if edge.accepted {
                        ConnectionConflict::AlreadyConnected
                    } else {
                        ConnectionConflict::DuplicateRequest
                    };
                    return Err(DomainError::from(conflict).into());
                }
                Some(edge) if edge.accepted => {
                    return Err(DomainError::from(ConnectionConflict::AlreadyConnected).into());
                }
                Some(reverse) => {
                    if repo.accept_pending(receiver, requester).await? {
                        let edge = Connection {
                            accepted: true,
                            ..reverse
                        };
                        info!(
                            requester = %requester,
                            receiver = %receiver,
                            "Crossing requests reconciled"
                        );
                        return Ok(ConnectionRequestResponse::from(&edge));
                    }
                    debug!(attempt, "Reverse request changed concurrently, retrying");
                }
                None => {
                    let edge = Connection::new(
                        requester,
                        receiver,
                        receiver_user.auto_accepts_connections(),
                    );
                    if repo.insert_if_absent(&edge).await? {
                        info!(
                            requester = %requester,
                            receiver = %receiver,
                            accepted = edge.accepted,
                            "Connection requested"
                        );
                        return Ok(ConnectionRequestResponse::from(&edge));
                    }
                    debug!(attempt, "Pair inserted concurrently, retrying");
                }
            }
        }

        warn!(
            requester = %requester,
            receiver = %receiver,
            "Connection request kept losing races"
        );
        Err(ServiceError::conflict(
            "Connection state changed concurrently, try again",
        ))
    }

    /// Accept the pending `requester -> receiver` request.
    /// Returns `false` if there is none in that direction.
    #[instrument(skip(self))]
    pub async fn accept_connection(
        &self,
        requester: Snowflake,
        receiver: Snowflake,
    ) -> ServiceResult<bool> {
        let accepted = self
            .ctx
            .connection_repo()
            .accept_pending(requester, receiver)
            .await?;
        if accepted {
            info!(requester = %requester, receiver = %receiver, "Connection accepted");
        }
        Ok(accepted)
    }

    /// Drop the pending `requester -> receiver` request.
    /// Returns `false` if there is none in that direction.
    #[instrument(skip(self))]
    pub async fn reject_connection(
        &self,
        requester: Snowflake,
        receiver: Snowflake,
    ) -> ServiceResult<bool> {
        let rejected = self
            .ctx
            .connection_repo()
            .delete_pending(requester, receiver)
            .await?;
        if rejected {
            info!(requester = %requester, receiver = %receiver, "Connection rejected");
        }
        Ok(rejected)
    }

    /// Delete whatever edge links the two users
    #[instrument(skip(self))]
    pub async fn remove_connection(&self, a: Snowflake, b: Snowflake) -> ServiceResult<bool> {
        let removed = self.ctx.connection_repo().delete_between(a, b).await?;
        if removed {
            info!(a = %a, b = %b, "Connection removed");
        }
        Ok(removed)
    }

    // =========================================================================
    // Username-addressed wrappers
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn request_by_username(
        &self,
        requester: Snowflake,
        receiver_username: &str,
    ) -> ServiceResult<ConnectionRequestResponse> {
        let receiver = self.users().get_entity_by_username(receiver_username).await?;
        self.request_connection(requester, receiver.id).await
    }

    /// `receiver` accepts the request sent by `requester_username`
    #[instrument(skip(self))]
    pub async fn accept_from(
        &self,
        receiver: Snowflake,
        requester_username: &str,
    ) -> ServiceResult<bool> {
        let requester = self.users().get_entity_by_username(requester_username).await?;
        self.accept_connection(requester.id, receiver).await
    }

    /// `receiver` rejects the request sent by `requester_username`
    #[instrument(skip(self))]
    pub async fn reject_from(
        &self,
        receiver: Snowflake,
        requester_username: &str,
    ) -> ServiceResult<bool> {
        let requester = self.users().get_entity_by_username(requester_username).await?;
        self.reject_connection(requester.id, receiver).await
    }

    #[instrument(skip(self))]
    pub async fn remove_by_username(
        &self,
        user_id: Snowflake,
        other_username: &str,
    ) -> ServiceResult<bool> {
        let other = self.users().get_entity_by_username(other_username).await?;
        self.remove_connection(user_id, other.id).await
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Users waiting for `user_id` to answer their request
    #[instrument(skip(self))]
    pub async fn list_received(&self, user_id: Snowflake) -> ServiceResult<Vec<UserResponse>> {
        let pending = self.ctx.connection_repo().pending_for(user_id).await?;
        let ids: Vec<Snowflake> = pending.iter().map(|edge| edge.requester).collect();
        self.load_users(&ids).await
    }

    /// Users `user_id` has asked and who have not answered yet
    #[instrument(skip(self))]
    pub async fn list_sent(&self, user_id: Snowflake) -> ServiceResult<Vec<UserResponse>> {
        let sent = self.ctx.connection_repo().sent_by(user_id).await?;
        let ids: Vec<Snowflake> = sent.iter().map(|edge| edge.receiver).collect();
        self.load_users(&ids).await
    }

    /// Connections of `username` as seen by `viewer`. A private account's
    /// connections are hidden from anyone who is not connected to it.
    #[instrument(skip(self))]
    pub async fn list_connections(
        &self,
        viewer: Snowflake,
        username: &str,
    ) -> ServiceResult<Vec<UserResponse>> {
        let target = self.users().get_entity_by_username(username).await?;
        let repo = self.ctx.connection_repo();

        if target.is_private && target.id != viewer && !repo.is_connected(viewer, target.id).await? {
            return Err(DomainError::ConnectionsHidden.into());
        }

        let peers = repo.accepted_peers(target.id).await?;
        self.load_users(&peers).await
    }

    #[instrument(skip(self))]
    pub async fn count_connections(&self, user_id: Snowflake) -> ServiceResult<i64> {
        Ok(self.ctx.connection_repo().count_peers(user_id).await?)
    }

    /// Resolve ids to users, keeping the order of `ids`
    async fn load_users(&self, ids: &[Snowflake]) -> ServiceResult<Vec<UserResponse>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_many(ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(UserResponse::from)
            .collect())
    }
}
