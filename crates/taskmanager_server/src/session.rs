//! Per-request storage scoping.
//!
//! Each handler acquires one `Session` inside a blocking worker, runs a single
//! task operation on it and drops it before the worker returns, whether the
//! operation succeeded or not.

use crate::error::{ApiError, ApiResult};
use taskmanager_core::{Database, RepoResult, SqliteTaskRepository, TaskService};

/// Service type handed to session-scoped operations.
pub type SessionService<'conn> = TaskService<SqliteTaskRepository<'conn>>;

/// Runs `operation` against a fresh session on the blocking thread pool.
///
/// # Errors
/// - `ApiError::Storage` when the session cannot be opened.
/// - Whatever `operation` returns, mapped through `From<RepoError>`.
/// - `ApiError::Internal` when the worker panics or is cancelled.
pub async fn with_session<T, F>(database: &Database, operation: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: for<'conn> FnOnce(&SessionService<'conn>) -> RepoResult<T> + Send + 'static,
{
    let database = database.clone();
    tokio::task::spawn_blocking(move || -> ApiResult<T> {
        let session = database.open_session()?;
        let service = TaskService::new(SqliteTaskRepository::new(session.connection()));
        let result = operation(&service);
        drop(service);
        drop(session);
        Ok(result?)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("storage worker join failed: {err}")))?
}
