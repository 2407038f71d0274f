//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the users table, without the password hash
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub is_private: bool,
    pub is_active: bool,
    pub is_2fa_enabled: bool,
    pub totp_secret: Option<String>,
    pub joined_at: DateTime<Utc>,
}
