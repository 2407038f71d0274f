//! Service context - dependency container for services
//!
//! Holds all repositories, the verification code store, and other
//! dependencies needed by services.

use std::sync::Arc;

use social_cache::{MemoryCodeStore, RedisCodeStore, RedisPool};
use social_common::{AppConfig, PasswordService, VerificationConfig};
use social_core::traits::{
    CodeStore, CommentRepository, ConnectionRepository, ContentRepository, HashtagRepository,
    Mailer, UserRepository,
};
use social_core::{Snowflake, SnowflakeGenerator};
use social_db::{
    MemoryDatabase, PgCommentRepository, PgConnectionRepository, PgContentRepository,
    PgHashtagRepository, PgPool, PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};
use super::mailer::LogMailer;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Repositories (PostgreSQL or in-memory)
/// - The short-lived verification code store
/// - Outbound mail
/// - Password hashing and Snowflake ID generation
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    connection_repo: Arc<dyn ConnectionRepository>,
    content_repo: Arc<dyn ContentRepository>,
    hashtag_repo: Arc<dyn HashtagRepository>,
    comment_repo: Arc<dyn CommentRepository>,

    // Ports
    code_store: Arc<dyn CodeStore>,
    mailer: Arc<dyn Mailer>,

    // Services
    password_service: PasswordService,
    snowflake_generator: Arc<SnowflakeGenerator>,
    verification: VerificationConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        connection_repo: Arc<dyn ConnectionRepository>,
        content_repo: Arc<dyn ContentRepository>,
        hashtag_repo: Arc<dyn HashtagRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        code_store: Arc<dyn CodeStore>,
        mailer: Arc<dyn Mailer>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        verification: VerificationConfig,
    ) -> Self {
        Self {
            user_repo,
            connection_repo,
            content_repo,
            hashtag_repo,
            comment_repo,
            code_store,
            mailer,
            password_service: PasswordService::new(),
            snowflake_generator,
            verification,
        }
    }

    /// Wire PostgreSQL repositories and the Redis code store
    pub fn postgres(pool: PgPool, redis_pool: RedisPool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgConnectionRepository::new(pool.clone())),
            Arc::new(PgContentRepository::new(pool.clone())),
            Arc::new(PgHashtagRepository::new(pool.clone())),
            Arc::new(PgCommentRepository::new(pool)),
            Arc::new(RedisCodeStore::new(redis_pool)),
            Arc::new(LogMailer::new(config.mail.from_address.clone())),
            Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)),
            config.verification.clone(),
        )
    }

    /// Wire every repository to one in-memory database
    pub fn in_memory(db: &MemoryDatabase) -> Self {
        Self::new(
            Arc::new(db.users()),
            Arc::new(db.connections()),
            Arc::new(db.contents()),
            Arc::new(db.hashtags()),
            Arc::new(db.comments()),
            Arc::new(MemoryCodeStore::new()),
            Arc::new(LogMailer::default()),
            Arc::new(SnowflakeGenerator::default()),
            VerificationConfig::default(),
        )
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the connection repository
    pub fn connection_repo(&self) -> &dyn ConnectionRepository {
        self.connection_repo.as_ref()
    }

    /// Get the content repository
    pub fn content_repo(&self) -> &dyn ContentRepository {
        self.content_repo.as_ref()
    }

    /// Get the hashtag repository
    pub fn hashtag_repo(&self) -> &dyn HashtagRepository {
        self.hashtag_repo.as_ref()
    }

    /// Get the comment repository
    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    // === Ports ===

    /// Get the verification code store
    pub fn code_store(&self) -> &dyn CodeStore {
        self.code_store.as_ref()
    }

    /// Get the outbound mailer
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    // === Services ===

    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    /// Seconds a verification code stays valid
    pub fn code_ttl_secs(&self) -> u64 {
        self.verification.code_ttl_secs
    }

    /// Issuer label for TOTP provisioning URIs
    pub fn totp_issuer(&self) -> &str {
        &self.verification.totp_issuer
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("code_store", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("code_ttl_secs", &self.verification.code_ttl_secs)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// Only the repositories are required; ports and the ID generator fall back
/// to the in-process defaults.
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    connection_repo: Option<Arc<dyn ConnectionRepository>>,
    content_repo: Option<Arc<dyn ContentRepository>>,
    hashtag_repo: Option<Arc<dyn HashtagRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    code_store: Option<Arc<dyn CodeStore>>,
    mailer: Option<Arc<dyn Mailer>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    verification: Option<VerificationConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn connection_repo(mut self, repo: Arc<dyn ConnectionRepository>) -> Self {
        self.connection_repo = Some(repo);
        self
    }

    pub fn content_repo(mut self, repo: Arc<dyn ContentRepository>) -> Self {
        self.content_repo = Some(repo);
        self
    }

    pub fn hashtag_repo(mut self, repo: Arc<dyn HashtagRepository>) -> Self {
        self.hashtag_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn code_store(mut self, store: Arc<dyn CodeStore>) -> Self {
        self.code_store = Some(store);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn verification(mut self, config: VerificationConfig) -> Self {
        self.verification = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo.ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.connection_repo
                .ok_or_else(|| ServiceError::validation("connection_repo is required"))?,
            self.content_repo.ok_or_else(|| ServiceError::validation("content_repo is required"))?,
            self.hashtag_repo.ok_or_else(|| ServiceError::validation("hashtag_repo is required"))?,
            self.comment_repo.ok_or_else(|| ServiceError::validation("comment_repo is required"))?,
            self.code_store
                .unwrap_or_else(|| Arc::new(MemoryCodeStore::new())),
            self.mailer.unwrap_or_else(|| Arc::new(LogMailer::default())),
            self.snowflake_generator.unwrap_or_default(),
            self.verification.unwrap_or_default(),
        ))
    }
}
