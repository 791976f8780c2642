//! Server configuration.
//!
//! Every setting can come from a command-line flag or a `TASKMANAGER_*`
//! environment variable; flags win.

use clap::Parser;
use std::path::PathBuf;

/// Runtime configuration for the task manager HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "taskmanager", version)]
#[command(about = "HTTP service for managing a to-do task list")]
pub struct ServerConfig {
    /// Host to bind to.
    #[arg(long, env = "TASKMANAGER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(long, env = "TASKMANAGER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// SQLite database file, created and migrated on startup.
    #[arg(long, env = "TASKMANAGER_DATABASE", default_value = "taskmanager.sqlite3")]
    pub database: PathBuf,

    /// One of trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "TASKMANAGER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotated log files. Logs go to stderr when unset.
    #[arg(long, env = "TASKMANAGER_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn effective_log_level(&self) -> &str {
        match self.log_level.as_deref() {
            Some(level) => level,
            None => taskmanager_core::default_log_level(),
        }
    }
}
