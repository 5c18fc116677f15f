//! Gridwalk Server - Entry Point
//!
//! A small multiplayer-presence backend: avatars on a grid, polled and
//! moved over HTTP.

use log::{error, info};

use gridwalk_server::Server;
use gridwalk_server::config::ServerConfig;
use gridwalk_server::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    // env_logger picks up the RUST_LOG environment variable
    setup_logging();

    info!("Launching avatar presence server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    server.start().await;
}
