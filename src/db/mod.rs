//! PostgreSQL side of the pipeline: schema management, CSV loading,
//! derived relationship tables, read-only reporting, and destructive
//! maintenance. Every subcommand opens one connection, runs its
//! statements sequentially, and closes.

pub mod loader;
pub mod maintenance;
pub mod relationships;
pub mod report;
pub mod schema;

use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// The pipeline is strictly sequential, so a single connection is enough.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.url)
        .await
}
