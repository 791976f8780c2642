//! Task manager server entry point.
//!
//! Parses configuration, starts logging, bootstraps the schema and serves.
//! Exits non-zero on any startup failure.

use clap::Parser;
use taskmanager_server::{HttpServer, ServerConfig};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    if let Err(err) =
        taskmanager_core::init_logging(config.effective_log_level(), config.log_dir.as_deref())
    {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    let server = match HttpServer::bootstrap(config) {
        Ok(server) => server,
        Err(err) => {
            log::error!("event=server_start module=server status=error error={err}");
            eprintln!("{err}");
            log::logger().flush();
            std::process::exit(1);
        }
    };

    if let Err(err) = server.start().await {
        log::error!("event=server_run module=server status=error error={err}");
        eprintln!("{err}");
        log::logger().flush();
        std::process::exit(1);
    }
}
