//! Tasks Domain
//!
//! Task CRUD with a cache-aside service in front of the store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP routes, id checks, status mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │   Service   │ ──► │  TaskCache  │  ← Redis or in-process moka
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← PostgreSQL or in-memory, unit of work for writes
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_tasks::{MemoryCacheStore, PgTaskRepository, TaskCache, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let repository = Arc::new(PgTaskRepository::new(db));
//! let cache = TaskCache::with_default_ttl(Arc::new(MemoryCacheStore::default()));
//! let service = TaskService::new(repository, cache);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use cache::{
    CacheError, CacheKey, CacheLookup, CacheStore, DEFAULT_CACHE_TTL, MemoryCacheStore,
    RedisCacheStore, TaskCache,
};
pub use error::{TaskError, TaskResult};
pub use handlers::{ApiDoc, TASKS_PATH};
pub use memory::InMemoryTaskRepository;
pub use models::{CreateTaskItem, ListTasksQuery, NewTaskItem, TaskItem, TaskItemDto, UpdateTaskItem};
pub use postgres::PgTaskRepository;
pub use repository::{TaskRepository, UnitOfWork};
pub use service::TaskService;
