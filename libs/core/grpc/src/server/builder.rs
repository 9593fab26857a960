//! Startup logging and health reporting for gRPC servers.

use super::config::ServerConfig;
use tonic_health::ServingStatus;
use tonic_health::server::HealthReporter;
use tracing::info;

/// Helpers shared by gRPC server binaries.
///
/// # Example
///
/// ```ignore
/// use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
/// use rpc::tasklist::task_list_server::SERVICE_NAME;
///
/// let (mut health_reporter, health_service) = create_health_service();
/// GrpcServer::setup_health(&mut health_reporter, SERVICE_NAME).await;
/// GrpcServer::log_startup(&config, SERVICE_NAME);
/// ```
pub struct GrpcServer;

impl GrpcServer {
    pub fn log_startup(config: &ServerConfig, service_name: &str) {
        info!(
            addr = %config.addr_string(),
            service = service_name,
            compression = config.enable_compression,
            request_timeout_secs = config.request_timeout.as_secs(),
            "gRPC server starting"
        );

        info!("Health check service enabled (grpc.health.v1.Health)");
    }

    /// Mark the service and the empty service name as serving
    ///
    /// The empty name is what default health probes ask for.
    pub async fn setup_health(health_reporter: &mut HealthReporter, service_name: &str) {
        Self::set_status(health_reporter, service_name, ServingStatus::Serving).await;
        info!(service = service_name, "Service marked as serving");
    }

    /// Flip both entries to not-serving ahead of shutdown
    pub async fn mark_not_serving(health_reporter: &mut HealthReporter, service_name: &str) {
        Self::set_status(health_reporter, service_name, ServingStatus::NotServing).await;
        info!(service = service_name, "Service marked as not serving");
    }

    async fn set_status(
        health_reporter: &mut HealthReporter,
        service_name: &str,
        status: ServingStatus,
    ) {
        health_reporter
            .set_service_status(service_name, status)
            .await;
        health_reporter.set_service_status("", status).await;
    }
}

pub use tonic_health::server::health_reporter as create_health_service;
