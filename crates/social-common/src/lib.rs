//! # social-common
//!
//! Shared utilities including configuration, error handling, credentials, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_numeric_code, generate_totp_secret, hash_password, provisioning_uri, validate_password_strength,
    verify_password, verify_totp, PasswordService,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, MailConfig, RedisConfig,
    SnowflakeConfig, VerificationConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
