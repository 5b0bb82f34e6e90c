use std::time::Duration;

use sqlx::{pool::PoolOptions, Pool, Postgres, Transaction};

use crate::settings::Config;

pub async fn init_pool(config: &Config) -> Pool<Postgres> {
    match PoolOptions::new()
        .min_connections(5)
        .max_connections(100)
        .idle_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => panic!("Failed to connect to database: {}", err),
    }
}

/// Bound every statement of the current transaction. Reset on commit/rollback.
pub async fn set_statement_timeout(
    tx: &mut Transaction<'_, Postgres>,
    seconds: u64,
) -> anyhow::Result<()> {
    sqlx::query(format!("SET LOCAL statement_timeout = '{}s'", seconds).as_str())
        .execute(&mut **tx)
        .await?;
    Ok(())
}
