//! Tasks Domain
//!
//! Entity, validation, persistence and business rules for the task list.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ Conversions │  ← wire messages ↔ domain types
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← validation, ids, timestamps, timeouts
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + PostgreSQL / in-memory implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Task, request DTOs, pagination
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{CreateTask, PgTaskRepository, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let repository = PgTaskRepository::new(db);
//! repository.ensure_schema().await?;
//!
//! let service = TaskService::new(repository);
//! let _task = service
//!     .create_task(CreateTask {
//!         title: "Buy milk".to_string(),
//!         description: String::new(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod conversions;
pub mod error;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{TaskError, TaskResult, ValidationError};
pub use memory::InMemoryTaskRepository;
pub use models::{CreateTask, ListTasks, Task, UpdateTask, validate_input};
pub use pagination::{PageCursor, PageRequest, TaskPage};
pub use postgres::PgTaskRepository;
pub use repository::TaskRepository;
pub use service::TaskService;
