//! HTTP surface for the task manager.
//!
//! Wires request validation and per-request storage sessions from
//! `taskmanager_core` into an axum router.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::AppState;
pub use server::{app, HttpServer, ServerError};
