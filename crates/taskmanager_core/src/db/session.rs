//! Database handle and scoped storage sessions.
//!
//! # Responsibility
//! - Run the one-time schema bootstrap at process start.
//! - Open one connection per unit of work and release it on drop.
//!
//! # Invariants
//! - `Database` holds no connection; it is the location of the store plus a
//!   live-session counter shared by all its clones.
//! - A `Session` is never handed out for a database whose schema version
//!   differs from `migrations::latest_version()`.
//! - Every opened session logs exactly one `session_release` event.

use super::migrations::{current_user_version, latest_version};
use super::open::{configure_connection, open_db};
use super::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Location of the task store.
///
/// Cloning is cheap; each clone opens its own sessions.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    open_sessions: Arc<AtomicUsize>,
}

impl Database {
    /// Creates the database file if needed and applies pending migrations.
    ///
    /// Idempotent: calling it on an up-to-date database changes nothing.
    pub fn bootstrap(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let conn = open_db(&path)?;
        drop(conn);

        info!(
            "event=db_bootstrap module=db status=ok schema_version={}",
            latest_version()
        );
        Ok(Self::at(path))
    }

    /// Wraps an existing path without touching the schema.
    ///
    /// Sessions opened from it fail with `SchemaNotReady` until the file has
    /// been bootstrapped.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of sessions opened from this handle (or its clones) and not
    /// yet released.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Opens a fresh session for one unit of work.
    ///
    /// # Errors
    /// - `DbError::Sqlite` when the file cannot be opened or configured.
    /// - `DbError::SchemaNotReady` when migrations have not been applied.
    pub fn open_session(&self) -> DbResult<Session> {
        let conn = Connection::open(&self.path)?;
        configure_connection(&conn)?;

        let db_version = current_user_version(&conn)?;
        let expected = latest_version();
        if db_version != expected {
            return Err(DbError::SchemaNotReady {
                db_version,
                expected,
            });
        }

        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        debug!("event=session_open module=db status=ok session_id={id}");
        Ok(Session {
            id,
            conn,
            opened_at: Instant::now(),
            open_sessions: Arc::clone(&self.open_sessions),
        })
    }
}

/// One scoped SQLite connection.
///
/// The connection closes when the session is dropped, whichever way the
/// owning scope exits.
#[derive(Debug)]
pub struct Session {
    id: u64,
    conn: Connection,
    opened_at: Instant,
    open_sessions: Arc<AtomicUsize>,
}

impl Session {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        debug!(
            "event=session_release module=db status=ok session_id={} held_ms={}",
            self.id,
            self.opened_at.elapsed().as_millis()
        );
    }
}
