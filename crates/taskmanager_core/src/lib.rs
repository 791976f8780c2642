//! Core domain logic for the task manager.
//! This crate is the single source of truth for task invariants and owns the
//! `tasks` table.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use db::{Database, DbError, DbResult, Session};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::task::{FieldUpdate, Task, TaskId, TaskParams, TaskPatch};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository,
};
pub use service::task_service::TaskService;
pub use validation::{FieldError, ValidationError, ValidationResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
