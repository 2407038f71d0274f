//! Connection entity <-> model mapper

use social_core::entities::Connection;
use social_core::value_objects::Snowflake;

use crate::models::ConnectionModel;

impl From<ConnectionModel> for Connection {
    fn from(model: ConnectionModel) -> Self {
        Connection {
            requester: Snowflake::new(model.requester_id),
            receiver: Snowflake::new(model.receiver_id),
            accepted: model.accepted,
            created_at: model.created_at,
        }
    }
}
