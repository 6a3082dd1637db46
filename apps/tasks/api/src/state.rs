//! Application state management.
//!
//! The state holds the configuration, the task service and the optional
//! external connections kept around for shutdown.

use domain_tasks::{TaskRepository, TaskService};

/// Task service over whichever store was configured at startup
pub type Tasks = TaskService<dyn TaskRepository>;

/// Shared application state.
///
/// Cloned for each handler; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    pub tasks: Tasks,
    /// PostgreSQL pool, when `DATABASE_URL` is set
    pub db: Option<database::postgres::DatabaseConnection>,
    /// Redis connection manager, when `REDIS_URL` is set
    pub redis: Option<database::redis::ConnectionManager>,
}
