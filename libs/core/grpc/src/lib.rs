//! # gRPC Client Library
//!
//! Shared gRPC plumbing for the task list server and its command-line client:
//! channel creation with HTTP/2 tuning, the request-id interceptor,
//! server configuration and health reporting, and wire timestamp helpers.
//!
//! ## Quick Start
//!
//! ### Client
//! ```ignore
//! use grpc_client::{create_channel, TracingInterceptor};
//! use rpc::tasklist::task_list_client::TaskListClient;
//!
//! let channel = create_channel("http://127.0.0.1:50051").await?;
//! let client = TaskListClient::with_interceptor(channel, TracingInterceptor::new())
//!     .accept_compressed(tonic::codec::CompressionEncoding::Zstd)
//!     .send_compressed(tonic::codec::CompressionEncoding::Zstd);
//! ```
//!
//! ### Server (feature `server`)
//! ```ignore
//! use core_config::FromEnv;
//! use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
//! use rpc::tasklist::task_list_server::SERVICE_NAME;
//!
//! let config = ServerConfig::from_env()?;
//! let (mut health_reporter, health_service) = create_health_service();
//! GrpcServer::setup_health(&mut health_reporter, SERVICE_NAME).await;
//! ```

pub mod channel;
pub mod conversions;
pub mod error;
pub mod interceptors;
#[cfg(feature = "server")]
pub mod server;

// Re-export main types and functions for convenience
pub use channel::{ChannelConfig, create_channel, create_channel_with_config};
pub use error::{GrpcError, GrpcResult};
pub use interceptors::{REQUEST_ID_HEADER, TracingInterceptor, request_id};
