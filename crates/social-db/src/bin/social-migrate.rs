//! Apply database migrations
//!
//! Reads `DATABASE_URL` (and the rest of the app config) from the environment.
//! An optional first argument overrides the migrations directory.

use std::path::PathBuf;
use std::process::ExitCode;

use social_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use social_db::{create_pool, default_migrations_dir, run_migrations, DatabaseConfig};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _ = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env));

    let dir = std::env::args_os()
        .nth(1)
        .map_or_else(default_migrations_dir, PathBuf::from);

    let pool = match create_pool(&DatabaseConfig::from(&config.database)).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_migrations(&pool, &dir).await {
        error!(error = %e, "Migration failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
