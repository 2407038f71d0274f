//! User entity - an account that owns content and connections

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// User account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub is_private: bool,
    pub is_active: bool,
    pub is_2fa_enabled: bool,
    /// Hex-encoded TOTP secret; present once 2FA setup has started
    pub totp_secret: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl User {
    pub const MAX_USERNAME_LEN: usize = 150;

    /// Create a new public, active user
    pub fn new(id: Snowflake, username: String) -> Self {
        Self {
            id,
            username,
            full_name: None,
            email: None,
            bio: None,
            is_private: false,
            is_active: true,
            is_2fa_enabled: false,
            totp_secret: None,
            joined_at: Utc::now(),
        }
    }

    /// Public accounts accept connection requests without approval
    #[inline]
    pub fn auto_accepts_connections(&self) -> bool {
        !self.is_private
    }

    /// Whether this user's content may appear in other people's explore feed
    #[inline]
    pub fn is_discoverable(&self) -> bool {
        self.is_active && !self.is_private
    }

    /// Validate a username: 1-150 characters of letters, digits and `@ . + - _`
    pub fn validate_username(username: &str) -> Result<(), DomainError> {
        if username.is_empty() {
            return Err(DomainError::InvalidUsername(
                "Username is required".to_string(),
            ));
        }

        if username.chars().count() > Self::MAX_USERNAME_LEN {
            return Err(DomainError::InvalidUsername(format!(
                "Username must be at most {} characters",
                Self::MAX_USERNAME_LEN
            )));
        }

        let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '+' | '-');
        if !username.chars().all(allowed) {
            return Err(DomainError::InvalidUsername(
                "Letters, digits and @/./+/-/_ only".to_string(),
            ));
        }

        Ok(())
    }
}
