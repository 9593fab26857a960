//! Database connectors and utilities.
//!
//! Only PostgreSQL is wired up. Connection settings come from a
//! [`postgres::PostgresConfig`], either built by hand or (with the `config`
//! feature) loaded from the environment.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `config` - `core_config::FromEnv` for `PostgresConfig`
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry, check_health};
//! use database::common::RetryConfig;
//! use core_config::FromEnv;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = connect_from_config_with_retry(config, Some(RetryConfig::new().with_max_retries(5))).await?;
//! check_health(&db).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
