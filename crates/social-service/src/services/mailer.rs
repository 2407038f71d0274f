//! Default outbound mail adapter
//!
//! Actual delivery is external; this adapter records each message in the log.

use async_trait::async_trait;
use social_core::traits::{Mailer, RepoResult};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LogMailer {
    from_address: String,
}

impl LogMailer {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }

    pub fn from_address(&self) -> &str {
        &self.from_address
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new("no-reply@localhost")
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> RepoResult<()> {
        info!(from = %self.from_address, to = %to, subject = %subject, "Mail dispatched");
        debug!(body = %body, "Mail body");
        Ok(())
    }
}
