use async_trait::async_trait;
use grpc_client::conversions::{datetime_to_rfc3339, rfc3339_to_datetime};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};

use crate::{
    error::{TaskError, TaskResult},
    models::Task,
    pagination::{PageRequest, TaskPage},
    repository::TaskRepository,
};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        completed BOOLEAN DEFAULT FALSE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        version BIGINT NOT NULL DEFAULT 1
    )
"#;

// Tables created before optimistic locking lack the column
const ADD_VERSION_SQL: &str =
    "ALTER TABLE tasks ADD COLUMN IF NOT EXISTS version BIGINT NOT NULL DEFAULT 1";

const CREATE_LIST_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS tasks_created_at_id_idx ON tasks (created_at DESC, id DESC)";

pub(crate) const INSERT_SQL: &str = r#"
    INSERT INTO tasks (id, title, description, completed, created_at, updated_at, version)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

pub(crate) const GET_SQL: &str = r#"
    SELECT id, title, description, completed, created_at, updated_at, version
    FROM tasks
    WHERE id = $1
"#;

pub(crate) const LIST_FIRST_SQL: &str = r#"
    SELECT id, title, description, completed, created_at, updated_at, version
    FROM tasks
    ORDER BY created_at DESC, id DESC
    LIMIT $1
"#;

pub(crate) const LIST_AFTER_SQL: &str = r#"
    SELECT id, title, description, completed, created_at, updated_at, version
    FROM tasks
    WHERE (created_at, id) < ($1, $2)
    ORDER BY created_at DESC, id DESC
    LIMIT $3
"#;

pub(crate) const UPDATE_SQL: &str = r#"
    UPDATE tasks
    SET title = $2, description = $3, completed = $4, updated_at = $5, version = version + 1
    WHERE id = $1 AND version = $6
    RETURNING id, title, description, completed, created_at, updated_at, version
"#;

pub(crate) const DELETE_SQL: &str = "DELETE FROM tasks WHERE id = $1";

/// PostgreSQL implementation of TaskRepository
///
/// Every statement is parameterized; timestamps are stored as fixed-width
/// RFC3339 text so `ORDER BY created_at` sorts chronologically.
#[derive(Clone)]
pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the `tasks` table and its list index if missing. Idempotent.
    pub async fn ensure_schema(&self) -> TaskResult<()> {
        for sql in [CREATE_TABLE_SQL, ADD_VERSION_SQL, CREATE_LIST_INDEX_SQL] {
            self.db.execute_unprepared(sql).await?;
        }
        tracing::info!("Task schema ready");
        Ok(())
    }

    pub fn into_inner(self) -> DatabaseConnection {
        self.db
    }

    async fn fetch_one(&self, stmt: Statement) -> TaskResult<Option<Task>> {
        TaskRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Task::try_from)
            .transpose()
    }
}

/// Row shape of the `tasks` table
#[derive(Debug, FromQueryResult)]
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    completed: Option<bool>,
    created_at: String,
    updated_at: String,
    version: i64,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let created_at = rfc3339_to_datetime(&row.created_at).map_err(|_| {
            TaskError::MalformedTimestamp {
                field: "created_at",
                value: row.created_at.clone(),
            }
        })?;
        let updated_at = rfc3339_to_datetime(&row.updated_at).map_err(|_| {
            TaskError::MalformedTimestamp {
                field: "updated_at",
                value: row.updated_at.clone(),
            }
        })?;

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            completed: row.completed.unwrap_or(false),
            created_at,
            updated_at,
            version: row.version,
        })
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: &Task) -> TaskResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            INSERT_SQL,
            [
                task.id.clone().into(),
                task.title.clone().into(),
                task.description.clone().into(),
                task.completed.into(),
                datetime_to_rfc3339(task.created_at).into(),
                datetime_to_rfc3339(task.updated_at).into(),
                task.version.into(),
            ],
        );

        self.db.execute_raw(stmt).await?;

        tracing::info!(task_id = %task.id, "Created task");
        Ok(())
    }

    async fn get(&self, id: &str) -> TaskResult<Task> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, GET_SQL, [id.into()]);

        self.fetch_one(stmt)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    async fn list(&self, page: PageRequest) -> TaskResult<TaskPage> {
        // One extra row tells us whether another page exists
        let fetch = (page.limit + 1) as i64;

        let stmt = match &page.after {
            None => Statement::from_sql_and_values(DbBackend::Postgres, LIST_FIRST_SQL, [fetch.into()]),
            Some(cursor) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                LIST_AFTER_SQL,
                [
                    datetime_to_rfc3339(cursor.created_at).into(),
                    cursor.id.clone().into(),
                    fetch.into(),
                ],
            ),
        };

        let rows = TaskRow::find_by_statement(stmt).all(&self.db).await?;
        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<TaskResult<Vec<_>>>()?;

        Ok(TaskPage::from_rows(tasks, page.limit))
    }

    async fn update(&self, task: &Task, expected_version: i64) -> TaskResult<Task> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            UPDATE_SQL,
            [
                task.id.clone().into(),
                task.title.clone().into(),
                task.description.clone().into(),
                task.completed.into(),
                datetime_to_rfc3339(task.updated_at).into(),
                expected_version.into(),
            ],
        );

        if let Some(updated) = self.fetch_one(stmt).await? {
            tracing::info!(task_id = %updated.id, version = updated.version, "Updated task");
            return Ok(updated);
        }

        // Nothing matched: either the row is gone or its version moved
        let current = self.get(&task.id).await?;
        Err(TaskError::Conflict {
            id: task.id.clone(),
            expected: expected_version,
            actual: current.version,
        })
    }

    async fn delete(&self, id: &str) -> TaskResult<()> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, DELETE_SQL, [id.into()]);

        let result = self.db.execute_raw(stmt).await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(id.to_string()));
        }

        tracing::info!(task_id = %id, "Deleted task");
        Ok(())
    }

    async fn ping(&self) -> TaskResult<()> {
        database::postgres::check_health(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageCursor;
    use chrono::{TimeZone, Utc};
    use sea_orm::{MockDatabase, MockExecResult, Transaction, Value};
    use std::collections::BTreeMap;

    fn row(id: &str, created_at: &str, version: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("id", Value::from(id.to_string())),
            ("title", Value::from(format!("title {}", id))),
            ("description", Value::from("details".to_string())),
            ("completed", Value::from(false)),
            ("created_at", Value::from(created_at.to_string())),
            ("updated_at", Value::from(created_at.to_string())),
            ("version", Value::from(version)),
        ])
    }

    fn sample_task() -> Task {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Task {
            id: "t-1".to_string(),
            title: "Write report".to_string(),
            description: "quarterly".to_string(),
            completed: false,
            created_at: at,
            updated_at: at,
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_create_binds_all_columns() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        repo.create(&sample_task()).await.unwrap();

        assert_eq!(
            repo.into_inner().into_transaction_log(),
            [Transaction::from_sql_and_values(
                DbBackend::Postgres,
                INSERT_SQL,
                [
                    "t-1".into(),
                    "Write report".into(),
                    "quarterly".into(),
                    false.into(),
                    "2024-05-01T12:00:00.000000Z".into(),
                    "2024-05-01T12:00:00.000000Z".into(),
                    1i64.into(),
                ],
            )]
        );
    }

    #[tokio::test]
    async fn test_get_decodes_row() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row("t-1", "2024-05-01T12:00:00.000000Z", 3)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let task = repo.get("t-1").await.unwrap();
        assert_eq!(task.id, "t-1");
        assert_eq!(task.version, 3);
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo.get("missing").await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound(ref id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_get_corrupt_timestamp() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row("t-1", "last tuesday", 1)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo.get("t-1").await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::MalformedTimestamp {
                field: "created_at",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_fetches_one_extra_row() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![
                row("c", "2024-05-03T00:00:00.000000Z", 1),
                row("b", "2024-05-02T00:00:00.000000Z", 1),
                row("a", "2024-05-01T00:00:00.000000Z", 1),
            ]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let page = repo.list(PageRequest::first(2)).await.unwrap();
        assert_eq!(page.tasks.len(), 2);
        assert_eq!(page.next.as_ref().map(|c| c.id.as_str()), Some("b"));

        assert_eq!(
            repo.into_inner().into_transaction_log(),
            [Transaction::from_sql_and_values(
                DbBackend::Postgres,
                LIST_FIRST_SQL,
                [3i64.into()],
            )]
        );
    }

    #[tokio::test]
    async fn test_list_after_cursor() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row("a", "2024-05-01T00:00:00.000000Z", 1)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let cursor = PageCursor {
            created_at: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            id: "b".to_string(),
        };
        let page = repo
            .list(PageRequest {
                limit: 10,
                after: Some(cursor),
            })
            .await
            .unwrap();
        assert_eq!(page.tasks.len(), 1);
        assert!(page.next.is_none());

        assert_eq!(
            repo.into_inner().into_transaction_log(),
            [Transaction::from_sql_and_values(
                DbBackend::Postgres,
                LIST_AFTER_SQL,
                ["2024-05-02T00:00:00.000000Z".into(), "b".into(), 11i64.into()],
            )]
        );
    }

    #[tokio::test]
    async fn test_update_returns_bumped_row() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row("t-1", "2024-05-01T12:00:00.000000Z", 2)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let updated = repo.update(&sample_task(), 1).await.unwrap();
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn test_update_version_mismatch_is_conflict() {
        let db = MockDatabase::new(DbBackend::Postgres)
            // guarded UPDATE matches nothing
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            // follow-up lookup finds the row at version 4
            .append_query_results([vec![row("t-1", "2024-05-01T12:00:00.000000Z", 4)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo.update(&sample_task(), 1).await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::Conflict {
                expected: 1,
                actual: 4,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([
                Vec::<BTreeMap<&str, Value>>::new(),
                Vec::<BTreeMap<&str, Value>>::new(),
            ])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo.update(&sample_task(), 1).await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        repo.delete("t-1").await.unwrap();
        let err = repo.delete("t-1").await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_database_error_propagates() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_errors([sea_orm::DbErr::Custom("duplicate key".to_string())])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo.create(&sample_task()).await.unwrap_err();
        assert!(matches!(err, TaskError::Database(_)));
    }
}
