//! PostgreSQL connection management shared by the apps
//!
//! Pool configuration from the environment, startup connection with bounded
//! retry, migration running and a health check for readiness probes.
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::common::RetryConfig;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, RetryConfig::startup()).await?;
//! postgres::run_migrations::<Migrator>(&db, "subscriptions_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
