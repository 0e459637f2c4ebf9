//! Server lifecycle management.

use crate::{
    config::ArchiveConfig,
    core::register_server,
    log,
    package::{ArchiveStore, spawn_sweeper, wait_for_sweeper},
};
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use std::{net::SocketAddr, sync::Arc, thread::JoinHandle};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Register server for graceful shutdown.
///
/// Ctrl+C then unblocks the request loop and signals the sweeper.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server, shutdown_tx);
}

/// Start evicting expired websites in the background.
///
/// A sweeper that fails to start is logged, not fatal: expired entries are
/// still invisible to downloads, they just stay in memory.
pub fn start_sweeper(
    store: Arc<ArchiveStore>,
    archive: &ArchiveConfig,
    shutdown_rx: Receiver<()>,
) -> Option<JoinHandle<()>> {
    match spawn_sweeper(store, archive.sweep_interval(), shutdown_rx) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log!("archive"; "sweeper not started: {:#}", e);
            None
        }
    }
}

/// Wait for the sweeper to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        wait_for_sweeper(handle);
    }
}
