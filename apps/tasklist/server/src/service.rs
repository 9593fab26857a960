//! `TaskList` gRPC trait implementation
//!
//! Handlers stay thin: proto ↔ domain mapping lives in
//! `domain_tasks::conversions`, status mapping in `From<TaskError> for Status`.

use domain_tasks::{TaskRepository, TaskService, conversions as conv};
use grpc_client::request_id;
use rpc::tasklist::{
    CreateTaskRequest, CreateTaskResponse, DeleteTaskRequest, DeleteTaskResponse, GetTaskRequest,
    GetTaskResponse, ListTasksRequest, ListTasksResponse, UpdateTaskRequest, UpdateTaskResponse,
    task_list_server::TaskList,
};
use tonic::{Request, Response, Status};
use tracing::debug;

/// gRPC service implementation for tasks
///
/// Generic over the repository so the same handlers run against
/// PostgreSQL and the in-memory store.
pub struct TaskListServiceImpl<R>
where
    R: TaskRepository + 'static,
{
    service: TaskService<R>,
}

impl<R> TaskListServiceImpl<R>
where
    R: TaskRepository + 'static,
{
    pub fn new(service: TaskService<R>) -> Self {
        Self { service }
    }
}

fn log_request<T: std::fmt::Debug>(method: &str, request: &Request<T>) {
    debug!(
        method,
        request_id = request_id(request).unwrap_or("-"),
        message = ?request.get_ref(),
        "Handling gRPC request"
    );
}

#[tonic::async_trait]
impl<R> TaskList for TaskListServiceImpl<R>
where
    R: TaskRepository + 'static,
{
    async fn create_task(
        &self,
        request: Request<CreateTaskRequest>,
    ) -> Result<Response<CreateTaskResponse>, Status> {
        log_request("CreateTask", &request);
        let task = self
            .service
            .create_task(request.into_inner().into())
            .await?;
        Ok(Response::new(task.into()))
    }

    async fn get_task(
        &self,
        request: Request<GetTaskRequest>,
    ) -> Result<Response<GetTaskResponse>, Status> {
        log_request("GetTask", &request);
        let task = self.service.get_task(&request.into_inner().id).await?;
        Ok(Response::new(task.into()))
    }

    async fn list_tasks(
        &self,
        request: Request<ListTasksRequest>,
    ) -> Result<Response<ListTasksResponse>, Status> {
        log_request("ListTasks", &request);
        let page = self
            .service
            .list_tasks(request.into_inner().into())
            .await?;
        Ok(Response::new(page.into()))
    }

    async fn update_task(
        &self,
        request: Request<UpdateTaskRequest>,
    ) -> Result<Response<UpdateTaskResponse>, Status> {
        log_request("UpdateTask", &request);
        let task = self
            .service
            .update_task(request.into_inner().into())
            .await?;
        Ok(Response::new(task.into()))
    }

    async fn delete_task(
        &self,
        request: Request<DeleteTaskRequest>,
    ) -> Result<Response<DeleteTaskResponse>, Status> {
        log_request("DeleteTask", &request);
        self.service.delete_task(&request.into_inner().id).await?;
        Ok(Response::new(conv::delete_response(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_tasks::InMemoryTaskRepository;
    use tonic::Code;

    fn service() -> TaskListServiceImpl<InMemoryTaskRepository> {
        TaskListServiceImpl::new(TaskService::new(InMemoryTaskRepository::new()))
    }

    async fn create(svc: &TaskListServiceImpl<InMemoryTaskRepository>, title: &str) -> rpc::tasklist::Task {
        svc.create_task(Request::new(CreateTaskRequest {
            title: title.to_string(),
            description: String::new(),
        }))
        .await
        .unwrap()
        .into_inner()
        .task
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let svc = service();
        let created = svc
            .create_task(Request::new(CreateTaskRequest {
                title: "Buy milk".to_string(),
                description: "2 liters".to_string(),
            }))
            .await
            .unwrap()
            .into_inner()
            .task
            .unwrap();

        assert!(!created.completed);
        assert_eq!(created.version, 1);
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.created_at.ends_with('Z'));

        let fetched = svc
            .get_task(Request::new(GetTaskRequest {
                id: created.id.clone(),
            }))
            .await
            .unwrap()
            .into_inner()
            .task
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_empty_title_is_invalid_argument() {
        let svc = service();
        let status = svc
            .create_task(Request::new(CreateTaskRequest {
                title: String::new(),
                description: String::new(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let svc = service();
        let status = svc
            .get_task(Request::new(GetTaskRequest {
                id: "missing".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);

        let status = svc
            .get_task(Request::new(GetTaskRequest { id: String::new() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_list_pages_through_tasks() {
        let svc = service();
        for title in ["a", "b", "c"] {
            create(&svc, title).await;
        }

        let first = svc
            .list_tasks(Request::new(ListTasksRequest {
                page_size: 2,
                page_token: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(first.tasks.len(), 2);
        assert!(!first.next_page_token.is_empty());

        let second = svc
            .list_tasks(Request::new(ListTasksRequest {
                page_size: 2,
                page_token: first.next_page_token.clone(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(second.tasks.len(), 1);
        assert!(second.next_page_token.is_empty());
        assert!(first.tasks.iter().all(|t| t.id != second.tasks[0].id));
    }

    #[tokio::test]
    async fn test_list_bad_token_is_invalid_argument() {
        let svc = service();
        let status = svc
            .list_tasks(Request::new(ListTasksRequest {
                page_size: 10,
                page_token: "%%%".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_and_stale_version() {
        let svc = service();
        let created = create(&svc, "draft").await;

        let updated = svc
            .update_task(Request::new(UpdateTaskRequest {
                id: created.id.clone(),
                title: "final".to_string(),
                description: "done".to_string(),
                completed: true,
                expected_version: Some(1),
            }))
            .await
            .unwrap()
            .into_inner()
            .task
            .unwrap();
        assert_eq!(updated.version, 2);
        assert!(updated.completed);
        assert_eq!(updated.created_at, created.created_at);

        let status = svc
            .update_task(Request::new(UpdateTaskRequest {
                id: created.id.clone(),
                title: "lost".to_string(),
                description: String::new(),
                completed: false,
                expected_version: Some(1),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Aborted);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let svc = service();
        let status = svc
            .update_task(Request::new(UpdateTaskRequest {
                id: "missing".to_string(),
                title: "x".to_string(),
                description: String::new(),
                completed: false,
                expected_version: None,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let svc = service();
        let created = create(&svc, "temp").await;

        let response = svc
            .delete_task(Request::new(DeleteTaskRequest {
                id: created.id.clone(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.success);

        let status = svc
            .delete_task(Request::new(DeleteTaskRequest { id: created.id }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }
}
