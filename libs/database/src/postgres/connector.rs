use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};

/// Connect using a PostgresConfig
///
/// The config is validated first; a bad pool setting never reaches sqlx.
///
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config};
/// use core_config::FromEnv;
///
/// let db = connect_from_config(PostgresConfig::from_env()?).await?;
/// ```
pub async fn connect_from_config(config: PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    config.validate()?;
    let target = config.redacted_url();
    let db = connect_with_options(config.into_connect_options()).await?;
    info!(url = %target, "Connected to PostgreSQL");
    Ok(db)
}

/// Connect with explicit SeaORM connection options
pub async fn connect_with_options(options: ConnectOptions) -> DatabaseResult<DatabaseConnection> {
    Ok(Database::connect(options).await?)
}

/// Connect from config, retrying with exponential backoff.
///
/// Useful at startup when the server may come up before the database.
/// `None` uses [`RetryConfig::default`].
///
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config_with_retry};
/// use database::common::RetryConfig;
///
/// let retry = RetryConfig::new().with_max_retries(5);
/// let db = connect_from_config_with_retry(config, Some(retry)).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    config.validate()?;
    let target = config.redacted_url();
    let options = config.into_connect_options();

    let attempt = || connect_with_options(options.clone());
    let db = match retry_config {
        Some(policy) => retry_with_backoff(attempt, policy).await,
        None => retry(attempt).await,
    }
    .map_err(|e| DatabaseError::ConnectionFailed(format!("{}: {}", target, e)))?;

    info!(url = %target, "Connected to PostgreSQL");
    Ok(db)
}
