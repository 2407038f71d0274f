//! Test fixtures and data generators
//!
//! Provides reusable request data for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::Utc;

use social_core::{MediaType, Snowflake};
use social_service::dto::{
    CreateCommentRequest, CreateMediaRequest, CreatePostRequest, RegisterRequest,
};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Distinguishes this run's rows in a shared database
pub fn run_id() -> i64 {
    static RUN_ID: OnceLock<i64> = OnceLock::new();
    *RUN_ID.get_or_init(|| Utc::now().timestamp_millis() % 1_000_000_000)
}

/// Password that satisfies the strength rules
pub const TEST_PASSWORD: &str = "TestPass123";

/// Registration with a username unique across the test run
pub fn register_request(prefix: &str) -> RegisterRequest {
    let suffix = format!("{}_{}", run_id(), unique_suffix());
    RegisterRequest {
        username: format!("{prefix}{suffix}"),
        email: Some(format!("{prefix}{suffix}@example.com")),
        password: TEST_PASSWORD.to_string(),
    }
}

pub fn post_request(description: &str) -> CreatePostRequest {
    CreatePostRequest {
        description: description.to_string(),
        thumbnail: None,
    }
}

pub fn media_request(description: &str, media_type: MediaType) -> CreateMediaRequest {
    CreateMediaRequest {
        description: description.to_string(),
        file: format!("media/{}.bin", unique_suffix()),
        media_type,
        thumbnail: None,
    }
}

pub fn comment_request(text: &str, reply_to: Option<Snowflake>) -> CreateCommentRequest {
    CreateCommentRequest {
        text: text.to_string(),
        reply_to,
    }
}
