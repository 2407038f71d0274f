//! User entity <-> model mapper

use social_core::entities::User;
use social_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            full_name: model.full_name,
            email: model.email,
            bio: model.bio,
            is_private: model.is_private,
            is_active: model.is_active,
            is_2fa_enabled: model.is_2fa_enabled,
            totp_secret: model.totp_secret,
            joined_at: model.joined_at,
        }
    }
}
