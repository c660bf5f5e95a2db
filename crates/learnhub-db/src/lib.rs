//! # learnhub-db
//!
//! PostgreSQL pool setup, embedded migrations, and the mapping from
//! `sqlx` errors onto the [`AppError`] taxonomy.
//!
//! # Example
//!
//! ```ignore
//! use learnhub_config::DatabaseConfig;
//! use learnhub_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! ```

use learnhub_config::DatabaseConfig;
use learnhub_core::AppError;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument, warn};

pub use sqlx::PgPool;

/// Schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens a connection pool sized by `config`.
#[instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to connect to database: {}", e)))?;

    info!("Database pool ready");
    Ok(pool)
}

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to run migrations: {}", e)))?;

    info!("Migrations applied");
    Ok(())
}

/// Classifies a database error.
///
/// Unique violations become [`ErrorKind::UniquenessConflict`], foreign-key
/// violations [`ErrorKind::ReferentialIntegrityViolation`], check
/// violations [`ErrorKind::ValidationFailure`], and a missing row
/// [`ErrorKind::NotFound`]. Anything else is internal.
///
/// [`ErrorKind::UniquenessConflict`]: learnhub_core::ErrorKind::UniquenessConflict
/// [`ErrorKind::ReferentialIntegrityViolation`]: learnhub_core::ErrorKind::ReferentialIntegrityViolation
/// [`ErrorKind::ValidationFailure`]: learnhub_core::ErrorKind::ValidationFailure
/// [`ErrorKind::NotFound`]: learnhub_core::ErrorKind::NotFound
pub fn map_db_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unnamed").to_string();

        if db_err.is_unique_violation() {
            warn!(%constraint, "Rejected duplicate write");
            return AppError::conflict(anyhow::anyhow!(
                "Duplicate value violates unique constraint {}",
                constraint
            ));
        }
        if db_err.is_foreign_key_violation() {
            warn!(%constraint, "Rejected write with dangling reference");
            return AppError::reference(anyhow::anyhow!(
                "Referenced row does not exist ({})",
                constraint
            ));
        }
        if db_err.is_check_violation() {
            warn!(%constraint, "Rejected write failing a check constraint");
            return AppError::validation(anyhow::anyhow!(
                "Value violates check constraint {}",
                constraint
            ));
        }
    }

    if matches!(err, sqlx::Error::RowNotFound) {
        return AppError::not_found(anyhow::anyhow!("Row not found"));
    }

    AppError::internal(anyhow::Error::from(err).context("Database operation failed"))
}

/// `ILIKE` pattern matching `term` anywhere, with `%`, `_` and `\`
/// in the term taken literally.
pub fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
