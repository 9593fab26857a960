use tonic::{Request, Status};

/// Metadata key carrying the per-call correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Interceptor that tags every outgoing call with a fresh `x-request-id`
///
/// # Example
/// ```ignore
/// use grpc_client::TracingInterceptor;
/// use rpc::tasklist::task_list_client::TaskListClient;
///
/// let channel = create_channel("http://127.0.0.1:50051").await?;
/// let client = TaskListClient::with_interceptor(channel, TracingInterceptor::new());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TracingInterceptor;

impl TracingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl tonic::service::Interceptor for TracingInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let request_id = uuid::Uuid::new_v4().to_string();

        request.metadata_mut().insert(
            REQUEST_ID_HEADER,
            request_id
                .parse()
                .map_err(|_| Status::internal("Failed to create request ID"))?,
        );

        tracing::debug!(
            target: "grpc_client",
            request_id = %request_id,
            "Outgoing gRPC request"
        );

        Ok(request)
    }
}

/// Read the correlation id off an incoming request, if the caller sent one
pub fn request_id<T>(request: &Request<T>) -> Option<&str> {
    request
        .metadata()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
}
