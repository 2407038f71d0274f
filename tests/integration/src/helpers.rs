//! Test helpers for integration tests
//!
//! Provides a wired service context plus shortcuts for the setup steps most
//! scenarios share.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use social_cache::RedisPool;
use social_common::AppConfig;
use social_core::traits::{Mailer, RepoResult};
use social_core::Snowflake;
use social_db::{create_pool, default_migrations_dir, run_migrations, DatabaseConfig, MemoryDatabase};
use social_service::dto::ContentSummaryResponse;
use social_service::{
    AccountService, ConnectionService, ContentService, LikeService, ServiceContext,
    ServiceContextBuilder, ServiceError, UserService,
};

use crate::fixtures::{post_request, register_request};

/// Service context together with the backing store
pub struct TestApp {
    pub ctx: ServiceContext,
    /// Present when running on the in-memory backend
    pub memory: Option<MemoryDatabase>,
}

impl TestApp {
    /// Services over a fresh in-memory database
    pub fn in_memory() -> Self {
        let db = MemoryDatabase::new();
        Self {
            ctx: ServiceContext::in_memory(&db),
            memory: Some(db),
        }
    }

    /// In-memory services whose mail lands in `outbox`
    pub fn with_outbox(outbox: Arc<MailOutbox>) -> Result<Self> {
        let db = MemoryDatabase::new();
        let ctx = ServiceContextBuilder::new()
            .user_repo(Arc::new(db.users()))
            .connection_repo(Arc::new(db.connections()))
            .content_repo(Arc::new(db.contents()))
            .hashtag_repo(Arc::new(db.hashtags()))
            .comment_repo(Arc::new(db.comments()))
            .mailer(outbox)
            .build()?;

        Ok(Self {
            ctx,
            memory: Some(db),
        })
    }

    /// Services over PostgreSQL and Redis from the environment
    pub async fn postgres() -> Result<Self> {
        let config = test_config()?;
        let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
        run_migrations(&pool, &default_migrations_dir()).await?;
        let redis = RedisPool::from_config(&config.redis)?;

        Ok(Self {
            ctx: ServiceContext::postgres(pool, redis, &config),
            memory: None,
        })
    }

    /// Register a public user with a unique name
    pub async fn user(&self, prefix: &str) -> Result<Snowflake> {
        let user = AccountService::new(&self.ctx)
            .register(register_request(prefix))
            .await?;
        Ok(Snowflake::parse(&user.id)?)
    }

    /// Register a user whose connection requests need approval
    pub async fn private_user(&self, prefix: &str) -> Result<Snowflake> {
        let id = self.user(prefix).await?;
        UserService::new(&self.ctx).set_private(id, true).await?;
        Ok(id)
    }

    pub async fn username(&self, id: Snowflake) -> Result<String> {
        Ok(UserService::new(&self.ctx).get_user_entity(id).await?.username)
    }

    pub async fn post(&self, owner: Snowflake, description: &str) -> Result<Snowflake> {
        let summary = ContentService::new(&self.ctx)
            .create_post(owner, post_request(description))
            .await?;
        content_id(&summary)
    }

    pub async fn like(&self, user: Snowflake, content: Snowflake) -> Result<()> {
        LikeService::new(&self.ctx).like(user, content).await?;
        Ok(())
    }

    /// Connect two users, accepting on the receiver's behalf when needed
    pub async fn connect(&self, a: Snowflake, b: Snowflake) -> Result<()> {
        let service = ConnectionService::new(&self.ctx);
        if !service.request_connection(a, b).await?.is_immediate() {
            service.accept_connection(a, b).await?;
        }
        Ok(())
    }

    /// Connection rows in the in-memory store
    pub fn connection_rows(&self) -> Option<usize> {
        self.memory.as_ref().map(MemoryDatabase::connection_rows)
    }
}

/// Mail captured instead of delivered
#[derive(Default)]
pub struct MailOutbox {
    sent: Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailOutbox {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last(&self) -> Option<SentMail> {
        self.sent.lock().last().cloned()
    }

    /// The code at the end of the latest mail body
    pub fn last_code(&self) -> Option<String> {
        self.last()
            .and_then(|mail| mail.body.rsplit(' ').next().map(str::to_string))
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

#[async_trait]
impl Mailer for MailOutbox {
    async fn send(&self, to: &str, subject: &str, body: &str) -> RepoResult<()> {
        self.sent.lock().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn content_id(summary: &ContentSummaryResponse) -> Result<Snowflake> {
    Ok(Snowflake::parse(&summary.id)?)
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Helper to check if the external test environment is available
pub fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Assert an error's status code and connection reason
pub fn assert_service_error(err: &ServiceError, status: u16, reason: Option<&str>) -> Result<()> {
    if err.status_code() != status || err.reason() != reason {
        anyhow::bail!(
            "Expected status {status} with reason {reason:?}, got {} with reason {:?}: {err}",
            err.status_code(),
            err.reason()
        );
    }
    Ok(())
}
