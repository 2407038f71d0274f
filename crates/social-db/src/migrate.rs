//! Schema migrations
//!
//! SQL files live in `crates/social-db/migrations` and are loaded at runtime.

use std::path::{Path, PathBuf};

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

/// Directory holding the migrations shipped with this crate
pub fn default_migrations_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations"))
}

/// Apply all pending migrations found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), MigrateError> {
    let migrator = Migrator::new(dir).await?;
    info!(
        dir = %dir.display(),
        available = migrator.iter().count(),
        "Applying database migrations"
    );
    migrator.run(pool).await?;
    info!("Database migrations up to date");
    Ok(())
}
