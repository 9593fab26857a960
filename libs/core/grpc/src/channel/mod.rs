pub mod config;

pub use config::ChannelConfig;

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

/// Connect to a gRPC server with the default [`ChannelConfig`]
///
/// ## Example
/// ```ignore
/// use grpc_client::create_channel;
/// use rpc::tasklist::task_list_client::TaskListClient;
///
/// let channel = create_channel("http://127.0.0.1:50051").await?;
/// let client = TaskListClient::new(channel);
/// ```
pub async fn create_channel(addr: impl Into<String>) -> GrpcResult<Channel> {
  create_channel_with_config(addr, ChannelConfig::default()).await
}

/// Connect to a gRPC server with custom HTTP/2 and timeout settings
pub async fn create_channel_with_config(
  addr: impl Into<String>,
  config: ChannelConfig,
) -> GrpcResult<Channel> {
  let addr_string = addr.into();

  let endpoint = Endpoint::from_shared(addr_string.clone()).map_err(|e| {
    tracing::error!(target: "grpc_client", addr = %addr_string, error = ?e, "Invalid URI");
    GrpcError::InvalidUri(e)
  })?;

  let endpoint = config.apply_to_endpoint(endpoint);

  tracing::debug!(target: "grpc_client", addr = %addr_string, "Creating gRPC channel");

  endpoint.connect().await.map_err(|e| {
    tracing::error!(
      target: "grpc_client",
      addr = %addr_string,
      error = ?e,
      "Failed to connect to gRPC service"
    );
    GrpcError::ConnectionFailed(e)
  })
}
