//! Postgres connection pool construction

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;

/// Connect to Postgres with the configured pool size.
///
/// The pool is the only shared state in the process; every request borrows
/// a connection from it and returns it when the handler future completes
/// or is dropped.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.url())
        .await?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "connected to postgres"
    );
    Ok(pool)
}
