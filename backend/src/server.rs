//! Server startup and configuration.

use anyhow::anyhow;
use dropshot::{ConfigDropshot, HttpServerStarter};
use pagination_basics::api::{AppState, PaginationApiImpl, pagination_api_mod};
use pagination_basics::graph::{Config, GraphSession};
use pagination_basics::pages::Pages;
use std::net::ToSocketAddrs;
use std::path::PathBuf;

/// Start the web server.
///
/// # Errors
///
/// Returns an error if:
/// - The bind address cannot be resolved
/// - The page templates cannot be compiled
/// - The API description cannot be created
/// - The server cannot be created
/// - The server encounters an error during operation
#[tokio::main]
pub async fn serve(
    address: &str,
    config: Config,
    static_dir: PathBuf,
    log: &slog::Logger,
) -> anyhow::Result<()> {
    let bind_address = address
        .to_socket_addrs()
        .map_err(|error| anyhow!("Invalid bind address: {error}"))?
        .next()
        .ok_or_else(|| anyhow!("Bind address {address:?} did not resolve"))?;

    let config_dropshot = ConfigDropshot {
        bind_address,
        default_request_body_max_bytes: 1024,
        default_handler_task_mode: dropshot::HandlerTaskMode::Detached,
        ..ConfigDropshot::default()
    };

    let api = pagination_api_mod::api_description::<PaginationApiImpl>()
        .map_err(|error| {
            anyhow!("Failed to create API description: {error}")
        })?;

    if !static_dir.is_dir() {
        slog::warn!(log, "Static directory {static_dir:?} does not exist");
    }

    let pages = Pages::new()
        .map_err(|error| anyhow!("Failed to compile templates: {error}"))?;
    let state =
        AppState { session: GraphSession::new(config), static_dir, pages };

    let server = HttpServerStarter::new(&config_dropshot, api, state, log)
        .map_err(|error| anyhow!("Failed to create server: {error}"))?
        .start();

    slog::info!(log, "Server running on http://{address}");

    server
        .await
        .map_err(|error| anyhow!("Server error: {error}"))
}
