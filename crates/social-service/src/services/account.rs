//! Account service
//!
//! Registration, credentials, mailed verification codes and TOTP 2FA.
//! Codes live in the [`CodeStore`](social_core::CodeStore) under
//! `<purpose>:<suffix>` keys and expire after the configured TTL.

use std::fmt;

use serde::{Deserialize, Serialize};
use social_common::{generate_numeric_code, generate_totp_secret, provisioning_uri, verify_totp};
use social_core::{DomainError, Snowflake, User};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dto::{
    ChangeEmailRequest, ChangePasswordRequest, CurrentUserResponse, PasswordResetRequest,
    RegisterRequest, TotpSetupResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::user::UserService;

const CODE_LEN: usize = 6;

/// What a mailed verification code authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    ResetPassword,
    ResetEmail,
    Reset2fa,
    Login2fa,
}

impl CodePurpose {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::ResetPassword => "reset_password",
            Self::ResetEmail => "reset_email",
            Self::Reset2fa => "reset_2fa",
            Self::Login2fa => "login_2fa",
        }
    }

    pub fn key(self, suffix: impl fmt::Display) -> String {
        format!("{}:{suffix}", self.prefix())
    }
}

/// Stored under `reset_email:<user_id>` until confirmed
#[derive(Debug, Serialize, Deserialize)]
struct PendingEmailChange {
    code: String,
    email: String,
}

/// Account service
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn users(&self) -> UserService<'a> {
        UserService::new(self.ctx)
    }

    /// Register a new public account
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<CurrentUserResponse> {
        request.validate()?;
        User::validate_username(&request.username)?;
        let password_hash = self.ctx.password_service().hash_new(&request.password)?;

        if self
            .ctx
            .user_repo()
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(DomainError::UsernameAlreadyExists.into());
        }

        let mut user = User::new(self.ctx.generate_id(), request.username);
        user.email = request.email;
        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered");
        Ok(CurrentUserResponse::from(&user))
    }

    /// Returns `false` when `old_password` does not match
    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        user_id: Snowflake,
        request: ChangePasswordRequest,
    ) -> ServiceResult<bool> {
        request.validate()?;
        let current_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        if !self
            .ctx
            .password_service()
            .verify(&request.old_password, &current_hash)?
        {
            return Ok(false);
        }

        let new_hash = self.ctx.password_service().hash_new(&request.new_password)?;
        self.ctx.user_repo().update_password(user_id, &new_hash).await?;
        info!(user_id = %user_id, "Password changed");
        Ok(true)
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Mail a reset code to the account's email address
    #[instrument(skip(self))]
    pub async fn send_password_reset_code(&self, username: &str) -> ServiceResult<()> {
        let user = self.users().get_entity_by_username(username).await?;
        let email = user
            .email
            .ok_or_else(|| ServiceError::validation("No email address on file"))?;

        let code = generate_numeric_code(CODE_LEN);
        self.store_code(CodePurpose::ResetPassword.key(&email), &code)
            .await?;
        self.dispatch(&email, "Password reset", &format!("Your reset code is {code}"))
            .await;

        info!(user_id = %user.id, "Password reset code issued");
        Ok(())
    }

    /// Returns `false` if the email is unknown or the code is missing or wrong
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn reset_password_with_code(
        &self,
        request: PasswordResetRequest,
    ) -> ServiceResult<bool> {
        request.validate()?;
        let Some(user) = self.ctx.user_repo().find_by_email(&request.email).await? else {
            return Ok(false);
        };

        let key = CodePurpose::ResetPassword.key(&request.email);
        if !self.code_matches(&key, &request.code).await? {
            return Ok(false);
        }

        let new_hash = self.ctx.password_service().hash_new(&request.new_password)?;
        self.ctx.user_repo().update_password(user.id, &new_hash).await?;
        self.ctx.code_store().remove(&key).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(true)
    }

    // =========================================================================
    // Email change
    // =========================================================================

    /// Mail a confirmation code to the new address
    #[instrument(skip(self, request))]
    pub async fn request_email_change(
        &self,
        user_id: Snowflake,
        request: ChangeEmailRequest,
    ) -> ServiceResult<()> {
        request.validate()?;
        let user = self.users().get_user_entity(user_id).await?;

        if let Some(owner) = self.ctx.user_repo().find_by_email(&request.email).await? {
            if owner.id != user.id {
                return Err(DomainError::EmailAlreadyExists.into());
            }
        }

        let code = generate_numeric_code(CODE_LEN);
        let pending = PendingEmailChange {
            code: code.clone(),
            email: request.email,
        };
        let value = serde_json::to_string(&pending)
            .map_err(|e| ServiceError::internal(format!("Failed to encode email change: {e}")))?;
        self.store_code(CodePurpose::ResetEmail.key(user_id), &value)
            .await?;
        self.dispatch(
            &pending.email,
            "Confirm your email",
            &format!("Your confirmation code is {code}"),
        )
        .await;

        info!(user_id = %user_id, "Email change requested");
        Ok(())
    }

    /// Returns `false` on a missing, mismatched or corrupt entry
    #[instrument(skip(self, code))]
    pub async fn confirm_email_change(&self, user_id: Snowflake, code: &str) -> ServiceResult<bool> {
        let key = CodePurpose::ResetEmail.key(user_id);
        let Some(raw) = self.ctx.code_store().get(&key).await? else {
            return Ok(false);
        };

        let pending: PendingEmailChange = match serde_json::from_str(&raw) {
            Ok(pending) => pending,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Corrupt email change entry");
                return Ok(false);
            }
        };
        if pending.code != code.trim() {
            return Ok(false);
        }

        let mut user = self.users().get_user_entity(user_id).await?;
        user.email = Some(pending.email);
        self.ctx.user_repo().update(&user).await?;
        self.ctx.code_store().remove(&key).await?;

        info!(user_id = %user_id, "Email changed");
        Ok(true)
    }

    // =========================================================================
    // TOTP two-factor authentication
    // =========================================================================

    /// Generate and store a new secret. 2FA stays disabled until
    /// [`enable_totp`](Self::enable_totp) confirms a code.
    #[instrument(skip(self))]
    pub async fn setup_totp(&self, user_id: Snowflake) -> ServiceResult<TotpSetupResponse> {
        let mut user = self.users().get_user_entity(user_id).await?;
        let secret = generate_totp_secret();
        let uri = provisioning_uri(&secret, &user.username, self.ctx.totp_issuer())?;
        user.totp_secret = Some(secret.clone());
        user.is_2fa_enabled = false;
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, "TOTP secret issued");
        Ok(TotpSetupResponse {
            secret,
            provisioning_uri: uri,
        })
    }

    #[instrument(skip(self, code))]
    pub async fn enable_totp(&self, user_id: Snowflake, code: &str) -> ServiceResult<bool> {
        let mut user = self.users().get_user_entity(user_id).await?;
        let secret = user
            .totp_secret
            .as_deref()
            .ok_or_else(|| ServiceError::validation("Two-factor authentication is not set up"))?;

        if !verify_totp(secret, code)? {
            return Ok(false);
        }

        user.is_2fa_enabled = true;
        self.ctx.user_repo().update(&user).await?;
        info!(user_id = %user_id, "Two-factor authentication enabled");
        Ok(true)
    }

    /// Check a code against an enabled secret
    #[instrument(skip(self, code))]
    pub async fn verify_totp(&self, user_id: Snowflake, code: &str) -> ServiceResult<bool> {
        let user = self.users().get_user_entity(user_id).await?;
        match (&user.totp_secret, user.is_2fa_enabled) {
            (Some(secret), true) => Ok(verify_totp(secret, code)?),
            _ => Ok(false),
        }
    }

    #[instrument(skip(self, code))]
    pub async fn disable_totp(&self, user_id: Snowflake, code: &str) -> ServiceResult<bool> {
        if !self.verify_totp(user_id, code).await? {
            return Ok(false);
        }

        let mut user = self.users().get_user_entity(user_id).await?;
        Self::clear_totp(&mut user);
        self.ctx.user_repo().update(&user).await?;
        info!(user_id = %user_id, "Two-factor authentication disabled");
        Ok(true)
    }

    /// Mail a code that turns 2FA off for users who lost their authenticator
    #[instrument(skip(self))]
    pub async fn send_2fa_reset_code(&self, username: &str) -> ServiceResult<()> {
        let user = self.users().get_entity_by_username(username).await?;
        let email = user
            .email
            .as_deref()
            .ok_or_else(|| ServiceError::validation("No email address on file"))?;

        let code = generate_numeric_code(CODE_LEN);
        self.store_code(CodePurpose::Reset2fa.key(user.id), &code).await?;
        self.dispatch(
            email,
            "Reset two-factor authentication",
            &format!("Your reset code is {code}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self, code))]
    pub async fn reset_2fa_with_code(&self, username: &str, code: &str) -> ServiceResult<bool> {
        let mut user = self.users().get_entity_by_username(username).await?;
        let key = CodePurpose::Reset2fa.key(user.id);
        if !self.code_matches(&key, code).await? {
            return Ok(false);
        }

        Self::clear_totp(&mut user);
        self.ctx.user_repo().update(&user).await?;
        self.ctx.code_store().remove(&key).await?;
        info!(user_id = %user.id, "Two-factor authentication reset by code");
        Ok(true)
    }

    /// Mail a one-time login code as the second factor
    #[instrument(skip(self))]
    pub async fn send_login_code(&self, user_id: Snowflake) -> ServiceResult<()> {
        let user = self.users().get_user_entity(user_id).await?;
        let email = user
            .email
            .as_deref()
            .ok_or_else(|| ServiceError::validation("No email address on file"))?;

        let code = generate_numeric_code(CODE_LEN);
        self.store_code(CodePurpose::Login2fa.key(user_id), &code).await?;
        self.dispatch(email, "Your login code", &format!("Your login code is {code}"))
            .await;
        Ok(())
    }

    /// Consume a mailed login code
    #[instrument(skip(self, code))]
    pub async fn verify_login_code(&self, user_id: Snowflake, code: &str) -> ServiceResult<bool> {
        let key = CodePurpose::Login2fa.key(user_id);
        if !self.code_matches(&key, code).await? {
            return Ok(false);
        }
        self.ctx.code_store().remove(&key).await?;
        Ok(true)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn clear_totp(user: &mut User) {
        user.is_2fa_enabled = false;
        user.totp_secret = None;
    }

    async fn store_code(&self, key: String, value: &str) -> ServiceResult<()> {
        self.ctx
            .code_store()
            .put(&key, value, self.ctx.code_ttl_secs())
            .await?;
        Ok(())
    }

    async fn code_matches(&self, key: &str, code: &str) -> ServiceResult<bool> {
        let stored = self.ctx.code_store().get(key).await?;
        Ok(stored.is_some_and(|stored| stored == code.trim()))
    }

    /// Delivery failures are logged, never returned
    async fn dispatch(&self, to: &str, subject: &str, body: &str) {
        if let Err(e) = self.ctx.mailer().send(to, subject, body).await {
            warn!(to = %to, subject = %subject, error = %e, "Mail delivery failed");
        }
    }
}
