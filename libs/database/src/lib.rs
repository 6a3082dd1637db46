//! Connectors and health checks for the task manager's backing services.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL via SeaORM, plus migration running
//! - `redis` (default) - Redis connection manager for the shared cache
//! - `config` - `core_config::FromEnv` implementations for the config structs
//! - `all` - everything above
//!
//! # Examples
//!
//! ## PostgreSQL
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "tasks_api").await?;
//! ```
//!
//! ## Redis
//!
//! ```ignore
//! use database::redis::{self, AsyncCommands};
//!
//! let mut conn = redis::connect("redis://127.0.0.1:6379").await?;
//! conn.set::<_, _, ()>("key", "value").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
