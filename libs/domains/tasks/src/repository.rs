use async_trait::async_trait;

use crate::error::TaskResult;
use crate::models::{NewTaskItem, TaskItem};

/// Read access to persisted tasks plus a way to open a unit of work for writes.
///
/// Implementations: [`crate::PgTaskRepository`] (PostgreSQL) and
/// [`crate::InMemoryTaskRepository`] (process-local).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get a task by ID
    async fn get_by_id(&self, id: i32) -> TaskResult<Option<TaskItem>>;

    /// List tasks, newest first, optionally filtered by completion state
    async fn list(&self, completed: Option<bool>) -> TaskResult<Vec<TaskItem>>;

    /// Start a unit of work. Nothing it stages is visible until `commit`.
    async fn begin(&self) -> TaskResult<Box<dyn UnitOfWork>>;

    /// Cheap connectivity probe used by readiness checks
    async fn ping(&self) -> TaskResult<()>;
}

/// A group of writes applied atomically by [`UnitOfWork::commit`].
///
/// Dropping a unit of work without committing discards everything it staged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send {
    async fn get_by_id(&mut self, id: i32) -> TaskResult<Option<TaskItem>>;

    /// Stage an insert; the returned item carries the assigned id.
    async fn insert(&mut self, item: NewTaskItem) -> TaskResult<TaskItem>;

    async fn update(&mut self, item: TaskItem) -> TaskResult<TaskItem>;

    async fn remove(&mut self, item: TaskItem) -> TaskResult<()>;

    /// Apply staged changes. Returns the number of affected rows.
    async fn commit(&mut self) -> TaskResult<u64>;
}
