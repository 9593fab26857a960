//! Task-specific proto ↔ domain conversions
//!
//! Pure structural transforms between the `tasklist` wire messages and the
//! domain types. No validation happens here; the service validates after
//! mapping.
//!
//! Generic helpers (RFC3339 timestamps, proto3 empty-string presence) are
//! re-exported from grpc_client::conversions.

use rpc::tasklist::{
    CreateTaskRequest, CreateTaskResponse, DeleteTaskResponse, GetTaskResponse,
    ListTasksRequest, ListTasksResponse, Task as ProtoTask, UpdateTaskRequest,
    UpdateTaskResponse,
};

use crate::error::TaskError;
use crate::models::{CreateTask, ListTasks, Task, UpdateTask};
use crate::pagination::TaskPage;

pub use grpc_client::conversions::*;

// ============================================================================
// Proto → Domain (Request types - for gRPC server)
// ============================================================================

impl From<CreateTaskRequest> for CreateTask {
    fn from(proto: CreateTaskRequest) -> Self {
        CreateTask {
            title: proto.title,
            description: proto.description,
        }
    }
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(proto: UpdateTaskRequest) -> Self {
        UpdateTask {
            id: proto.id,
            title: proto.title,
            description: proto.description,
            completed: proto.completed,
            expected_version: proto.expected_version,
        }
    }
}

impl From<ListTasksRequest> for ListTasks {
    fn from(proto: ListTasksRequest) -> Self {
        ListTasks {
            page_size: proto.page_size,
            page_token: non_empty(proto.page_token),
        }
    }
}

// ============================================================================
// Domain → Proto (Request types - for gRPC client)
// ============================================================================

impl From<CreateTask> for CreateTaskRequest {
    fn from(input: CreateTask) -> Self {
        CreateTaskRequest {
            title: input.title,
            description: input.description,
        }
    }
}

impl From<UpdateTask> for UpdateTaskRequest {
    fn from(input: UpdateTask) -> Self {
        UpdateTaskRequest {
            id: input.id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            expected_version: input.expected_version,
        }
    }
}

impl From<ListTasks> for ListTasksRequest {
    fn from(input: ListTasks) -> Self {
        ListTasksRequest {
            page_size: input.page_size,
            page_token: opt_to_string(input.page_token),
        }
    }
}

// ============================================================================
// Entity conversions
// ============================================================================

impl From<Task> for ProtoTask {
    fn from(task: Task) -> Self {
        ProtoTask {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: datetime_to_rfc3339(task.created_at),
            updated_at: datetime_to_rfc3339(task.updated_at),
            version: task.version,
        }
    }
}

impl TryFrom<ProtoTask> for Task {
    type Error = TaskError;

    fn try_from(proto: ProtoTask) -> Result<Self, Self::Error> {
        let created_at =
            rfc3339_to_datetime(&proto.created_at).map_err(|_| TaskError::MalformedTimestamp {
                field: "created_at",
                value: proto.created_at.clone(),
            })?;
        let updated_at =
            rfc3339_to_datetime(&proto.updated_at).map_err(|_| TaskError::MalformedTimestamp {
                field: "updated_at",
                value: proto.updated_at.clone(),
            })?;

        Ok(Task {
            id: proto.id,
            title: proto.title,
            description: proto.description,
            completed: proto.completed,
            created_at,
            updated_at,
            version: proto.version,
        })
    }
}

// ============================================================================
// Domain → Proto (Response types - for gRPC server)
// ============================================================================

impl From<Task> for CreateTaskResponse {
    fn from(task: Task) -> Self {
        CreateTaskResponse {
            task: Some(task.into()),
        }
    }
}

impl From<Task> for GetTaskResponse {
    fn from(task: Task) -> Self {
        GetTaskResponse {
            task: Some(task.into()),
        }
    }
}

impl From<Task> for UpdateTaskResponse {
    fn from(task: Task) -> Self {
        UpdateTaskResponse {
            task: Some(task.into()),
        }
    }
}

impl From<TaskPage> for ListTasksResponse {
    fn from(page: TaskPage) -> Self {
        let next_page_token = opt_to_string(page.next_page_token());
        ListTasksResponse {
            tasks: page.tasks.into_iter().map(Into::into).collect(),
            next_page_token,
        }
    }
}

pub fn delete_response(success: bool) -> DeleteTaskResponse {
    DeleteTaskResponse { success }
}
