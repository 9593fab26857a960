use std::fmt::Write;

use clap::Subcommand;
use eyre::{Result, WrapErr, eyre};
use grpc_client::TracingInterceptor;
use rpc::tasklist::task_list_client::TaskListClient;
use rpc::tasklist::{
    CreateTaskRequest, DeleteTaskRequest, GetTaskRequest, ListTasksRequest, Task,
    UpdateTaskRequest,
};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;

pub type Client = TaskListClient<InterceptedService<Channel, TracingInterceptor>>;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List tasks, newest first
    List {
        /// Tasks per page (server clamps to 1..=100, default 10)
        #[arg(short, long, default_value_t = 10)]
        page_size: i32,

        /// Token from a previous page
        #[arg(long)]
        page_token: Option<String>,

        /// Follow page tokens until the last page
        #[arg(short, long)]
        all: bool,
    },

    /// Create a task
    Create {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show one task
    Get { id: String },

    /// Change fields of a task; unspecified fields keep their current value
    Update {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        completed: Option<bool>,

        /// Fail unless the task is still at this version (defaults to the version just read)
        #[arg(long)]
        expected_version: Option<i64>,
    },

    /// Delete a task
    Delete { id: String },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::List {
            page_size: 10,
            page_token: None,
            all: false,
        }
    }
}

impl Commands {
    /// Run the command and render its result for the terminal
    pub async fn execute(self, client: &mut Client) -> Result<String> {
        match self {
            Commands::List {
                page_size,
                page_token,
                all,
            } => {
                let mut tasks = Vec::new();
                let mut token = page_token.unwrap_or_default();
                loop {
                    let page = client
                        .list_tasks(ListTasksRequest {
                            page_size,
                            page_token: token,
                        })
                        .await
                        .wrap_err("Could not list tasks")?
                        .into_inner();
                    tasks.extend(page.tasks);
                    token = page.next_page_token;

                    if !all || token.is_empty() {
                        break;
                    }
                }
                Ok(format_list(&tasks, &token))
            }
            Commands::Create { title, description } => {
                let task = client
                    .create_task(CreateTaskRequest { title, description })
                    .await
                    .wrap_err("Could not create task")?
                    .into_inner()
                    .task
                    .ok_or_else(|| eyre!("server returned no task"))?;
                Ok(format!("Created task {}\n{}", task.id, format_task(&task)))
            }
            Commands::Get { id } => {
                let task = fetch(client, id).await?;
                Ok(format_task(&task))
            }
            Commands::Update {
                id,
                title,
                description,
                completed,
                expected_version,
            } => {
                let current = fetch(client, id).await?;
                let request = overlay(current, title, description, completed, expected_version);
                let task = client
                    .update_task(request)
                    .await
                    .wrap_err("Could not update task")?
                    .into_inner()
                    .task
                    .ok_or_else(|| eyre!("server returned no task"))?;
                Ok(format!("Updated task {}\n{}", task.id, format_task(&task)))
            }
            Commands::Delete { id } => {
                let response = client
                    .delete_task(DeleteTaskRequest { id: id.clone() })
                    .await
                    .wrap_err_with(|| format!("Could not delete task {}", id))?
                    .into_inner();
                Ok(format!("Task deleted: {}", response.success))
            }
        }
    }
}

async fn fetch(client: &mut Client, id: String) -> Result<Task> {
    client
        .get_task(GetTaskRequest { id: id.clone() })
        .await
        .wrap_err_with(|| format!("Could not get task {}", id))?
        .into_inner()
        .task
        .ok_or_else(|| eyre!("server returned no task"))
}

/// Build a full update from the stored task and the fields the user gave
fn overlay(
    current: Task,
    title: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
    expected_version: Option<i64>,
) -> UpdateTaskRequest {
    UpdateTaskRequest {
        id: current.id,
        title: title.unwrap_or(current.title),
        description: description.unwrap_or(current.description),
        completed: completed.unwrap_or(current.completed),
        expected_version: Some(expected_version.unwrap_or(current.version)),
    }
}

fn format_task(task: &Task) -> String {
    format!(
        "{} - {} (Completed: {})\n  id: {}  version: {}  created: {}  updated: {}",
        task.title,
        task.description,
        task.completed,
        task.id,
        task.version,
        task.created_at,
        task.updated_at
    )
}

fn format_list(tasks: &[Task], next_page_token: &str) -> String {
    let mut out = format!("Tasks: {}", tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {} - {} (Completed: {}) [{}]",
            i + 1,
            task.title,
            task.description,
            task.completed,
            task.id
        );
    }
    if !next_page_token.is_empty() {
        let _ = write!(out, "\nNext page: --page-token {}", next_page_token);
    }
    out
}
