//! End-to-end tests over a real socket against the in-memory store

use std::time::Duration;

use domain_tasks::InMemoryTaskRepository;
use grpc_client::server::ServerConfig;
use grpc_client::{ChannelConfig, TracingInterceptor, create_channel_with_config};
use rpc::tasklist::task_list_client::TaskListClient;
use rpc::tasklist::task_list_server::SERVICE_NAME;
use rpc::tasklist::{CreateTaskRequest, DeleteTaskRequest, GetTaskRequest, ListTasksRequest};
use tasklist_server::serve;
use tokio::sync::oneshot;
use tonic::Code;
use tonic::codec::CompressionEncoding;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

struct RunningServer {
    addr: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<eyre::Result<()>>,
}

impl RunningServer {
    async fn start() -> Self {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ServerConfig::new().with_host("127.0.0.1").with_port(port);

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(serve(InMemoryTaskRepository::new(), config, async {
            let _ = rx.await;
        }));

        Self {
            addr: format!("http://127.0.0.1:{}", port),
            shutdown: Some(tx),
            handle,
        }
    }

    async fn channel(&self) -> Channel {
        let config = ChannelConfig::new().with_request_timeout(Duration::from_secs(5));
        for _ in 0..50 {
            if let Ok(channel) = create_channel_with_config(self.addr.clone(), config.clone()).await {
                return channel;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("server at {} never came up", self.addr);
    }

    async fn client(&self) -> TaskListClient<InterceptedService<Channel, TracingInterceptor>> {
        TaskListClient::with_interceptor(self.channel().await, TracingInterceptor::new())
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_crud_over_the_wire() {
    let server = RunningServer::start().await;
    let mut client = server.client().await;

    let created = client
        .create_task(CreateTaskRequest {
            title: "Write report".to_string(),
            description: "Q3".to_string(),
        })
        .await
        .unwrap()
        .into_inner()
        .task
        .unwrap();
    assert_eq!(created.version, 1);

    let fetched = client
        .get_task(GetTaskRequest {
            id: created.id.clone(),
        })
        .await
        .unwrap()
        .into_inner()
        .task
        .unwrap();
    assert_eq!(fetched, created);

    let listed = client
        .list_tasks(ListTasksRequest {
            page_size: 0,
            page_token: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(listed.tasks, vec![created.clone()]);
    assert!(listed.next_page_token.is_empty());

    let deleted = client
        .delete_task(DeleteTaskRequest {
            id: created.id.clone(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(deleted.success);

    let status = client
        .get_task(GetTaskRequest { id: created.id })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    server.stop().await;
}

#[tokio::test]
async fn test_validation_maps_to_invalid_argument() {
    let server = RunningServer::start().await;
    let mut client = server.client().await;

    let status = client
        .create_task(CreateTaskRequest {
            title: "x".repeat(256),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    server.stop().await;
}

#[tokio::test]
async fn test_health_reports_serving() {
    let server = RunningServer::start().await;
    let mut health = HealthClient::new(server.channel().await);

    for service in [SERVICE_NAME, ""] {
        let response = health
            .check(HealthCheckRequest {
                service: service.to_string(),
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.status, ServingStatus::Serving as i32);
    }

    server.stop().await;
}
