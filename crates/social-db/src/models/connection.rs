//! Connection database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ConnectionModel {
    pub requester_id: i64,
    pub receiver_id: i64,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}
