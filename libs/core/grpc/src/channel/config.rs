use std::time::Duration;
use tonic::transport::Endpoint;

/// Configuration for gRPC channel creation
///
/// Builder over the HTTP/2 and TCP settings applied to a tonic `Endpoint`.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
  // HTTP/2 Keep-Alive
  pub http2_keep_alive_interval: Option<Duration>,
  pub keep_alive_timeout: Duration,
  pub keep_alive_while_idle: bool,

  // Connection settings
  pub connect_timeout: Duration,
  pub timeout: Duration,

  // Window sizes (HTTP/2 flow control)
  pub initial_connection_window_size: Option<u32>,
  pub initial_stream_window_size: Option<u32>,
  pub http2_adaptive_window: bool,

  // TCP settings
  pub tcp_nodelay: bool,
  pub tcp_keepalive: Option<Duration>,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      http2_keep_alive_interval: Some(Duration::from_secs(30)),
      keep_alive_timeout: Duration::from_secs(10),
      keep_alive_while_idle: true,
      connect_timeout: Duration::from_secs(5),
      timeout: Duration::from_secs(30),
      initial_connection_window_size: Some(1024 * 1024), // 1MB
      initial_stream_window_size: Some(1024 * 1024),     // 1MB
      http2_adaptive_window: true,
      tcp_nodelay: true,
      tcp_keepalive: Some(Duration::from_secs(30)),
    }
  }
}

impl ChannelConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  /// Deadline applied to every RPC sent over the channel
  ///
  /// # Example
  /// ```
  /// use grpc_client::ChannelConfig;
  /// use std::time::Duration;
  ///
  /// let config = ChannelConfig::new().with_request_timeout(Duration::from_secs(5));
  /// assert_eq!(config.timeout, Duration::from_secs(5));
  /// ```
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub(crate) fn apply_to_endpoint(self, mut endpoint: Endpoint) -> Endpoint {
    if let Some(interval) = self.http2_keep_alive_interval {
      endpoint = endpoint.http2_keep_alive_interval(interval);
    }
    endpoint = endpoint
      .keep_alive_timeout(self.keep_alive_timeout)
      .keep_alive_while_idle(self.keep_alive_while_idle);

    endpoint = endpoint
      .connect_timeout(self.connect_timeout)
      .timeout(self.timeout);

    if let Some(size) = self.initial_connection_window_size {
      endpoint = endpoint.initial_connection_window_size(size);
    }
    if let Some(size) = self.initial_stream_window_size {
      endpoint = endpoint.initial_stream_window_size(size);
    }
    endpoint = endpoint.http2_adaptive_window(self.http2_adaptive_window);

    endpoint = endpoint.tcp_nodelay(self.tcp_nodelay);
    if let Some(keepalive) = self.tcp_keepalive {
      endpoint = endpoint.tcp_keepalive(Some(keepalive));
    }

    endpoint
  }
}
