//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `id` and `created_at` are never written after insert.
//! - Each mutation reads, writes and reads back inside one IMMEDIATE
//!   transaction, so a failed write leaves the prior row untouched and
//!   concurrent writers wait on the busy timeout.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::task::{FieldUpdate, Task, TaskId, TaskParams, TaskPatch};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    completed,
    created_at
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// `Some(flag)` keeps only tasks whose `completed` equals `flag`.
    pub completed: Option<bool>,
}

/// Repository interface for task CRUD operations.
///
/// Lookups return `Ok(None)` for a missing id; mutations return
/// `RepoError::NotFound`.
pub trait TaskRepository {
    fn create_task(&self, params: &TaskParams) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn replace_task(&self, id: TaskId, params: &TaskParams) -> RepoResult<Task>;
    fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository borrowing a session connection.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Starts a write transaction holding the RESERVED lock up front, so
    /// racing writers queue on the busy timeout.
    fn begin_write(&self) -> RepoResult<Transaction<'conn>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        Ok(tx)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, params: &TaskParams) -> RepoResult<Task> {
        let tx = self.begin_write()?;
        tx.execute(
            "INSERT INTO tasks (
                title,
                description,
                completed,
                created_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                params.title.as_str(),
                params.description.as_deref(),
                bool_to_int(params.completed),
                Utc::now(),
            ],
        )?;

        let id = tx.last_insert_rowid();
        let task = select_task(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted task {id} could not be read back"))
        })?;
        tx.commit()?;

        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        select_task(self.conn, id)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn replace_task(&self, id: TaskId, params: &TaskParams) -> RepoResult<Task> {
        let tx = self.begin_write()?;
        if select_task(&tx, id)?.is_none() {
            return Err(RepoError::NotFound(id));
        }

        tx.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                completed = ?3
             WHERE id = ?4;",
            params![
                params.title.as_str(),
                params.description.as_deref(),
                bool_to_int(params.completed),
                id,
            ],
        )?;

        let task = select_task(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(task)
    }

    fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        let tx = self.begin_write()?;
        let Some(current) = select_task(&tx, id)? else {
            return Err(RepoError::NotFound(id));
        };

        if patch.is_empty() {
            return Ok(current);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let FieldUpdate::Set(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let FieldUpdate::Set(description) = &patch.description {
            assignments.push("description = ?");
            bind_values.push(match description {
                Some(text) => Value::Text(text.clone()),
                None => Value::Null,
            });
        }
        if let FieldUpdate::Set(completed) = patch.completed {
            assignments.push("completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        bind_values.push(Value::Integer(id));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?;", assignments.join(", "));
        tx.execute(&sql, params_from_iter(bind_values))?;

        let task = select_task(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(task)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn select_task(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare_cached(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id], |row| Ok(parse_task_row(row)))
        .optional()?;

    row.transpose()
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed for id {id}"
            )));
        }
    };

    let title: String = row.get("title")?;
    if title.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty title in tasks.title for id {id}"
        )));
    }

    Ok(Task {
        id,
        title,
        description: row.get("description")?,
        completed,
        created_at: row.get("created_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
