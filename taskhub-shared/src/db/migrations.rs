/// Database migration runner
///
/// This module provides utilities for running database migrations using
/// sqlx's migration system.
///
/// # Migration Files
///
/// Migrations are stored in the `migrations/` directory at the workspace root.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskhub_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// This function:
/// 1. Checks if the migrations table exists (creates if needed)
/// 2. Runs all migrations that haven't been applied yet
/// 3. Returns an error if any migration fails
///
/// # Errors
///
/// Returns an error if:
/// - A migration file is malformed
/// - A migration fails to execute
/// - Database connection is lost during migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Counts the migrations that have been applied
///
/// Useful for health/status reporting.
///
/// # Errors
///
/// Returns an error if the `_sqlx_migrations` table cannot be queried
/// (for example, before the first migration run).
pub async fn applied_migration_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
