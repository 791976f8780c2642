//! # HTTP Server
//!
//! Bootstraps the database, builds the router and serves it until a shutdown
//! signal arrives.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use log::info;
use taskmanager_core::Database;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes::{method_not_allowed, route_not_found, task_routes, AppState};

/// Errors that stop the server from starting or running
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("database bootstrap failed: {0}")]
    Bootstrap(#[from] taskmanager_core::DbError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    task_routes(state)
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(access_log))
}

/// HTTP Server for the task manager
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Runs schema migrations once, then prepares the router.
    ///
    /// Request handling never creates tables; this is the only place the
    /// schema is brought up to date.
    pub fn bootstrap(config: ServerConfig) -> Result<Self, ServerError> {
        let database = Database::bootstrap(config.database.clone())?;
        let router = app(AppState::new(database));
        Ok(Self { config, router })
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_text = self.config.socket_addr();
        let addr: SocketAddr = addr_text
            .parse()
            .map_err(|source| ServerError::InvalidAddress {
                addr: addr_text.clone(),
                source,
            })?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            "event=server_start module=server status=ok addr={} database={}",
            addr,
            self.config.database.display()
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("event=server_stop module=server status=ok");
        Ok(())
    }
}

async fn access_log(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::warn!(
                    "event=signal_install module=server status=error signal=sigterm error={err}"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("event=shutdown_requested module=server status=ok");
}
