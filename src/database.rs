use sqlx::postgres::PgPoolOptions;
use tracing::error;

use crate::{configuration::DatabaseConfig, DbPool};

/// Opens a bounded connection pool and performs one liveness probe.
///
/// A probe failure is returned to the caller so that startup can abort;
/// no handle escapes in that case.
pub async fn connect(config: &DatabaseConfig) -> sqlx::Result<DbPool> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(config.with_db())
        .await?;
    health_check(&pool).await?;
    Ok(pool)
}

#[tracing::instrument(name = "Probing database liveness", skip_all)]
pub async fn health_check(pool: &DbPool) -> sqlx::Result<()> {
    sqlx::query("select 1;")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            error!("Database liveness probe failed: {:?}", e);
            e
        })
}
