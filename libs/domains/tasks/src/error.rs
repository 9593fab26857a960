use std::time::Duration;
use thiserror::Error;
use tonic::Status;

/// Input rule violations, reported one at a time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("id is required")]
    MissingId,

    #[error("title is required")]
    EmptyTitle,

    #[error("title must be at most 255 characters")]
    TitleTooLong,

    #[error("description must be at most 1000 characters")]
    DescriptionTooLong,

    #[error("page token is invalid")]
    InvalidPageToken,

    #[error("invalid input: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        id: String,
        expected: i64,
        actual: i64,
    },

    #[error("Stored {field} is not a valid RFC3339 timestamp: {value:?}")]
    MalformedTimestamp { field: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        TaskError::Database(err.to_string())
    }
}

/// The single place domain errors become gRPC statuses.
///
/// Internal causes are logged here and replaced by a generic message.
impl From<TaskError> for Status {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(e) => Status::invalid_argument(e.to_string()),
            TaskError::NotFound(id) => Status::not_found(format!("task {} not found", id)),
            TaskError::Conflict { .. } => Status::aborted(err.to_string()),
            TaskError::Timeout(_) => Status::deadline_exceeded(err.to_string()),
            TaskError::Database(_) | TaskError::MalformedTimestamp { .. } => {
                tracing::error!(error = %err, "Internal error while handling task request");
                Status::internal("internal error")
            }
        }
    }
}
