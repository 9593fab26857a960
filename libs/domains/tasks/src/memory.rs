use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{TaskError, TaskResult};
use crate::models::Task;
use crate::pagination::{PageRequest, TaskPage, sort_key};
use crate::repository::TaskRepository;

/// In-memory implementation of TaskRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> TaskResult<()> {
        let mut tasks = self.tasks.write().await;

        if tasks.contains_key(&task.id) {
            return Err(TaskError::Database(format!(
                "duplicate key value violates unique constraint: id={}",
                task.id
            )));
        }

        tasks.insert(task.id.clone(), task.clone());
        tracing::info!(task_id = %task.id, "Created task");
        Ok(())
    }

    async fn get(&self, id: &str) -> TaskResult<Task> {
        let tasks = self.tasks.read().await;
        tasks
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    async fn list(&self, page: PageRequest) -> TaskResult<TaskPage> {
        let tasks = self.tasks.read().await;

        let mut rows: Vec<Task> = tasks
            .values()
            .filter(|t| match &page.after {
                Some(cursor) => sort_key(t) < (cursor.created_at, cursor.id.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
        rows.truncate(page.limit as usize + 1);

        Ok(TaskPage::from_rows(rows, page.limit))
    }

    async fn update(&self, task: &Task, expected_version: i64) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;

        let stored = tasks
            .get_mut(&task.id)
            .ok_or_else(|| TaskError::NotFound(task.id.clone()))?;

        if stored.version != expected_version {
            return Err(TaskError::Conflict {
                id: task.id.clone(),
                expected: expected_version,
                actual: stored.version,
            });
        }

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.completed = task.completed;
        stored.updated_at = task.updated_at;
        stored.version += 1;

        tracing::info!(task_id = %task.id, version = stored.version, "Updated task");
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> TaskResult<()> {
        let mut tasks = self.tasks.write().await;
        match tasks.remove(id) {
            Some(_) => {
                tracing::info!(task_id = %id, "Deleted task");
                Ok(())
            }
            None => Err(TaskError::NotFound(id.to_string())),
        }
    }

    async fn ping(&self) -> TaskResult<()> {
        Ok(())
    }
}
