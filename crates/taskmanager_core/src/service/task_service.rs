//! Task use-case service.
//!
//! # Responsibility
//! - Provide the create/list/get/replace/patch/delete entry points.
//! - Turn missing rows into `RepoError::NotFound` for every by-id operation.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Log lines carry ids and field names only, never task text.

use crate::model::task::{Task, TaskId, TaskParams, TaskPatch};
use crate::repo::task_repo::{RepoError, RepoResult, TaskListQuery, TaskRepository};
use log::{debug, info};

/// Use-case service wrapper for task CRUD operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task and returns it with its assigned id and timestamp.
    pub fn create_task(&self, params: &TaskParams) -> RepoResult<Task> {
        let task = self.repo.create_task(params)?;
        info!(
            "event=task_create module=service status=ok task_id={} completed={}",
            task.id, task.completed
        );
        Ok(task)
    }

    /// Lists all tasks, or only those matching `completed` when given.
    pub fn list_tasks(&self, completed: Option<bool>) -> RepoResult<Vec<Task>> {
        let tasks = self.repo.list_tasks(&TaskListQuery { completed })?;
        debug!(
            "event=task_list module=service status=ok filter={} count={}",
            completed.map_or("none".to_string(), |flag| flag.to_string()),
            tasks.len()
        );
        Ok(tasks)
    }

    /// Gets one task by id.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no row has this id.
    pub fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        self.repo.get_task(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Overwrites title, description and completed of an existing task.
    ///
    /// Defaults already folded into `params` are written too.
    pub fn replace_task(&self, id: TaskId, params: &TaskParams) -> RepoResult<Task> {
        let task = self.repo.replace_task(id, params)?;
        info!("event=task_replace module=service status=ok task_id={id}");
        Ok(task)
    }

    /// Writes only the fields present in `patch`.
    pub fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        let task = self.repo.patch_task(id, patch)?;
        info!(
            "event=task_patch module=service status=ok task_id={} fields={}",
            id,
            patch.set_fields().join(",")
        );
        Ok(task)
    }

    /// Permanently removes a task.
    pub fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }
}
