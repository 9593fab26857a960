//! Task list gRPC server
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   ↓ (gRPC, optional Zstd compression)
//! TaskListServiceImpl (service.rs)
//!   ↓ (proto ↔ domain conversions via From/TryFrom traits)
//! TaskService (domain layer: validation, versions, timeouts)
//!   ↓
//! PgTaskRepository → PostgreSQL   |   InMemoryTaskRepository (--in-memory)
//! ```
//!
//! ## Modules
//!
//! - `server`: startup, store selection, health reporting, graceful shutdown
//! - `service`: `TaskList` trait implementation

pub mod server;
pub mod service;

pub use server::{Args, run, serve};
pub use service::TaskListServiceImpl;
