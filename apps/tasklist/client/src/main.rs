//! Task list command-line client
//!
//! Talks to the task list server over gRPC. With no subcommand it lists
//! the first page of tasks.

use std::time::Duration;

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::{Result, WrapErr};
use grpc_client::{ChannelConfig, TracingInterceptor, create_channel_with_config};
use rpc::tasklist::task_list_client::TaskListClient;
use tonic::codec::CompressionEncoding;
use tracing::debug;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Create, list, update and delete tasks on a task list server")]
struct Cli {
    /// Server address
    #[arg(long, env = "TASKLIST_ADDR", default_value = "http://127.0.0.1:50051")]
    addr: String,

    /// Per-request deadline in seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Log gRPC traffic to stderr (filter with RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing(&Environment::from_env());
    }

    let timeout = Duration::from_secs(cli.timeout_secs);
    let config = ChannelConfig::new()
        .with_connect_timeout(timeout)
        .with_request_timeout(timeout);

    debug!(addr = %cli.addr, "Connecting to task list server");
    let channel = create_channel_with_config(cli.addr.clone(), config)
        .await
        .wrap_err_with(|| format!("Failed to connect to {}", cli.addr))?;

    let mut client = TaskListClient::with_interceptor(channel, TracingInterceptor::new())
        .accept_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Zstd);

    let command = cli.command.unwrap_or_default();
    let output = command.execute(&mut client).await?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_list() {
        let cli = Cli::try_parse_from(["tasklist"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.timeout_secs, 5);
    }

    #[test]
    fn test_addr_flag() {
        let cli = Cli::try_parse_from(["tasklist", "--addr", "http://10.0.0.1:6000", "get", "abc"]).unwrap();
        assert_eq!(cli.addr, "http://10.0.0.1:6000");
        assert!(matches!(cli.command, Some(Commands::Get { ref id }) if id == "abc"));
    }
}
