use core_config::ConfigError;
use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors from gRPC channel creation and server configuration
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for connection
  #[error("Invalid URI: {0}")]
  InvalidUri(#[from] tonic::transport::Error),

  /// Failed to establish connection
  #[error("Connection failed: {0}")]
  ConnectionFailed(tonic::transport::Error),

  /// Listen address could not be parsed
  #[error("Invalid listen address {addr}: {source}")]
  InvalidAddress {
    addr: String,
    source: std::net::AddrParseError,
  },

  /// Environment configuration could not be loaded
  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri(_) | GrpcError::InvalidAddress { .. } | GrpcError::Config(_) => {
        tonic::Status::invalid_argument(err.to_string())
      }
      GrpcError::ConnectionFailed(_) => tonic::Status::unavailable(err.to_string()),
    }
  }
}
