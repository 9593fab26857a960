//! gRPC server initialization and lifecycle management
//!
//! - Tracing initialization
//! - Store selection (PostgreSQL, or in-memory for local runs)
//! - Health check service (grpc.health.v1.Health)
//! - gRPC server startup and graceful shutdown

use std::future::Future;

use clap::Parser;
use core_config::{Environment, FromEnv};
use database::postgres::{PostgresConfig, check_health_detailed, connect_from_config_with_retry};
use domain_tasks::{InMemoryTaskRepository, PgTaskRepository, TaskRepository, TaskService};
use eyre::{Result, WrapErr};
use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
use rpc::tasklist::task_list_server::{SERVICE_NAME, TaskListServer};
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tracing::{info, warn};

use crate::service::TaskListServiceImpl;

/// Command-line flags
#[derive(Debug, Parser)]
#[command(name = "tasklist-server", about = "Task list gRPC server")]
pub struct Args {
    /// Keep tasks in process memory instead of PostgreSQL
    #[arg(long, env = "TASKLIST_IN_MEMORY")]
    pub in_memory: bool,
}

/// Run the gRPC server until Ctrl-C
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database cannot be
/// reached after retries, the schema cannot be created, or the listener fails.
pub async fn run() -> Result<()> {
    let args = Args::parse();

    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let config = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;

    if args.in_memory {
        info!("Using in-memory task store; data is lost on exit");
        serve(InMemoryTaskRepository::new(), config, shutdown_signal()).await
    } else {
        let repository = connect_postgres().await?;
        serve(repository, config, shutdown_signal()).await
    }
}

async fn connect_postgres() -> Result<PgTaskRepository> {
    let config = PostgresConfig::from_env().wrap_err("Failed to load database configuration")?;

    info!(url = %config.redacted_url(), "Connecting to database...");
    let db = connect_from_config_with_retry(config, None)
        .await
        .wrap_err("Failed to connect to database")?;

    let status = check_health_detailed(&db).await;
    if status.healthy {
        info!(response_time_ms = status.response_time_ms, "Connected to database successfully");
    } else {
        warn!(
            response_time_ms = status.response_time_ms,
            message = status.message.as_deref().unwrap_or_default(),
            "Database connected but health check failed"
        );
    }

    let repository = PgTaskRepository::new(db);
    repository
        .ensure_schema()
        .await
        .wrap_err("Failed to create tasks table")?;

    Ok(repository)
}

/// Serve the `TaskList` and health services on `config`'s address
///
/// Returns once `shutdown` resolves and in-flight requests have drained.
pub async fn serve<R, F>(repository: R, config: ServerConfig, shutdown: F) -> Result<()>
where
    R: TaskRepository + 'static,
    F: Future<Output = ()>,
{
    let addr = config.socket_addr()?;
    let service = TaskService::new(repository).with_timeout(config.request_timeout);

    let (mut health_reporter, health_service) = create_health_service();
    match service.health().await {
        Ok(()) => GrpcServer::setup_health(&mut health_reporter, SERVICE_NAME).await,
        Err(e) => {
            warn!(error = %e, "Task store unreachable at startup");
            GrpcServer::mark_not_serving(&mut health_reporter, SERVICE_NAME).await;
        }
    }

    let mut tasklist = TaskListServer::new(TaskListServiceImpl::new(service))
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);
    if config.enable_compression {
        tasklist = tasklist
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd);
    }

    GrpcServer::log_startup(&config, SERVICE_NAME);

    Server::builder()
        .timeout(config.request_timeout)
        .add_service(health_service)
        .add_service(tasklist)
        .serve_with_shutdown(addr, async move {
            shutdown.await;
            GrpcServer::mark_not_serving(&mut health_reporter, SERVICE_NAME).await;
        })
        .await
        .wrap_err("gRPC server failed")?;

    info!("gRPC server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
