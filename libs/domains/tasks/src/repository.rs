use async_trait::async_trait;

use crate::error::TaskResult;
use crate::models::Task;
use crate::pagination::{PageRequest, TaskPage};

/// Persistence interface for tasks
///
/// Implementations: [`crate::PgTaskRepository`] (PostgreSQL) and
/// [`crate::InMemoryTaskRepository`] (tests, `--in-memory` mode).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a fully populated task. A duplicate id is a `Database` error.
    async fn create(&self, task: &Task) -> TaskResult<()>;

    /// Fetch by id; `NotFound` when absent.
    async fn get(&self, id: &str) -> TaskResult<Task>;

    /// Newest first, ordered by `(created_at, id)` descending.
    async fn list(&self, page: PageRequest) -> TaskResult<TaskPage>;

    /// Overwrite title, description, completed and updated_at when the stored
    /// version equals `expected_version`, and bump the version.
    ///
    /// Returns the stored task. `NotFound` if the row is gone, `Conflict`
    /// if its version moved.
    async fn update(&self, task: &Task, expected_version: i64) -> TaskResult<Task>;

    /// Remove by id; `NotFound` when nothing was deleted.
    async fn delete(&self, id: &str) -> TaskResult<()>;

    /// Backend liveness check
    async fn ping(&self) -> TaskResult<()>;
}
