//! Server configuration loaded from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_bool, env_or_default, env_parse};

use crate::error::{GrpcError, GrpcResult};

/// Configuration for gRPC server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 50051)
    pub port: u16,
    /// Enable Zstd compression (default: true)
    pub enable_compression: bool,
    /// Maximum message size for encoding and decoding (default: 4MB)
    pub max_message_size: usize,
    /// Per-request deadline enforced by the transport (default: 30s)
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            enable_compression: true,
            max_message_size: 4 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl FromEnv for ServerConfig {
    /// Reads:
    /// - `GRPC_HOST` (default: 0.0.0.0)
    /// - `GRPC_PORT` (default: 50051)
    /// - `GRPC_COMPRESSION` (default: true)
    /// - `GRPC_MAX_MESSAGE_SIZE` (default: 4194304)
    /// - `GRPC_REQUEST_TIMEOUT_SECS` (default: 30)
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: env_or_default("GRPC_HOST", &defaults.host),
            port: env_parse("GRPC_PORT", defaults.port)?,
            enable_compression: env_bool("GRPC_COMPRESSION", defaults.enable_compression)?,
            max_message_size: env_parse("GRPC_MAX_MESSAGE_SIZE", defaults.max_message_size)?,
            request_timeout: Duration::from_secs(env_parse(
                "GRPC_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
        })
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the socket address to bind to.
    pub fn socket_addr(&self) -> GrpcResult<SocketAddr> {
        let addr = self.addr_string();
        addr.parse()
            .map_err(|source| GrpcError::InvalidAddress { addr, source })
    }

    /// Get the address string (for logging).
    pub fn addr_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
