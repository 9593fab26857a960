use chrono::Utc;
use grpc_client::conversions::truncate_to_micros;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult, ValidationError};
use crate::models::{CreateTask, ListTasks, Task, UpdateTask, validate_input};
use crate::pagination::{PageRequest, TaskPage};
use crate::repository::TaskRepository;

/// Upper bound on a single store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Service layer for Task business logic
///
/// Validates input, assigns ids and timestamps, and bounds every store
/// call by a timeout. Dropping a returned future cancels the in-flight
/// store call.
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
    timeout: Duration,
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            timeout: self.timeout,
        }
    }
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T>(&self, op: impl Future<Output = TaskResult<T>>) -> TaskResult<T> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| TaskError::Timeout(self.timeout))?
    }

    /// Create a new task with validation
    #[instrument(skip(self, input), fields(task_id))]
    pub async fn create_task(&self, input: CreateTask) -> TaskResult<Task> {
        validate_input(&input)?;

        let now = truncate_to_micros(Utc::now());
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
            version: 1,
        };
        tracing::Span::current().record("task_id", task.id.as_str());

        self.bounded(self.repository.create(&task)).await?;
        Ok(task)
    }

    /// Get a task by ID
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: &str) -> TaskResult<Task> {
        if id.is_empty() {
            return Err(ValidationError::MissingId.into());
        }
        self.bounded(self.repository.get(id)).await
    }

    /// One page of tasks, newest first
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, input: ListTasks) -> TaskResult<TaskPage> {
        let page = PageRequest::try_from(input)?;
        self.bounded(self.repository.list(page)).await
    }

    /// Replace title, description and completed on an existing task.
    ///
    /// Fails with `Conflict` if `expected_version` is given and stale, or if
    /// another writer updates the task between the read and the write.
    #[instrument(skip(self, input), fields(task_id = %input.id))]
    pub async fn update_task(&self, input: UpdateTask) -> TaskResult<Task> {
        validate_input(&input)?;

        let mut task = self.bounded(self.repository.get(&input.id)).await?;

        if let Some(expected) = input.expected_version {
            if expected != task.version {
                return Err(TaskError::Conflict {
                    id: task.id,
                    expected,
                    actual: task.version,
                });
            }
        }

        let read_version = task.version;
        task.apply_update(&input, truncate_to_micros(Utc::now()));

        self.bounded(self.repository.update(&task, read_version)).await
    }

    /// Delete a task
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: &str) -> TaskResult<()> {
        if id.is_empty() {
            return Err(ValidationError::MissingId.into());
        }
        self.bounded(self.repository.delete(id)).await
    }

    /// Whether the backing store answers
    pub async fn health(&self) -> TaskResult<()> {
        self.bounded(self.repository.ping()).await
    }
}
