//! HTTP API server.
//!
//! ```text
//! bind_server ──► BoundServer::run
//!                   ├─ sweeper thread (tokio, evicts expired websites)
//!                   └─ request loop ──► rayon pool ──► Route ──► App ──► Reply
//! ```

mod handlers;
mod lifecycle;
mod path;
mod response;
mod route;

use crate::{
    config::{AppConfig, ServeConfig},
    debug, log,
    package::ArchiveStore,
    pipeline::Pipeline,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use handlers::App;
use response::Reply;
use route::Route;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 50 * 1024 * 1024;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server(config: &ServeConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.interface, config.port)?;
    let addr = server.server_addr().to_ip().unwrap_or(addr);
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        shutdown_rx,
    })
}

/// Bind and serve until Ctrl+C.
pub fn serve(config: &AppConfig) -> Result<()> {
    bind_server(&config.serve)?.run(config)
}

impl BoundServer {
    /// Start the request loop (blocking).
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let upload_dir = config.upload_dir().to_path_buf();
        std::fs::create_dir_all(&upload_dir)
            .with_context(|| format!("Failed to create {}", upload_dir.display()))?;

        // The bound port may differ from the configured one after a retry.
        let base_url = match config.serve.public_url {
            Some(_) => config.serve.base_url(),
            None => format!("http://{}", self.addr),
        };
        debug!("serve"; "preview base {}", base_url);

        let store = Arc::new(ArchiveStore::new(config.archive.retention()));
        let pipeline = Pipeline::from_config(config, Arc::clone(&store))?.with_base_url(base_url);
        let app = Arc::new(App::new(pipeline, upload_dir));

        let sweeper = lifecycle::start_sweeper(store, &config.archive, self.shutdown_rx);
        let result = run_request_loop(&self.server, &app, config.serve.workers);
        lifecycle::wait_for_shutdown(sweeper);
        result
    }
}

fn run_request_loop(server: &Server, app: &Arc<App>, workers: usize) -> Result<()> {
    // Generation blocks on the model for up to minutes; keep other routes responsive
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("serve-{i}"))
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let app = Arc::clone(app);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &app) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, app: &App) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return Reply::unavailable().send(request);
    }

    let route = Route::parse(request.method(), request.url());
    debug!("serve"; "{} {}", request.method(), request.url());

    let body = if route == Route::Generate {
        match read_body(&mut request)? {
            Some(body) => body,
            None => return Reply::error(413, "Request body too large").send(request),
        }
    } else {
        Vec::new()
    };

    app.dispatch(route, &body).send(request)
}

/// Read the request body, `None` when it exceeds [`MAX_BODY_BYTES`].
fn read_body(request: &mut Request) -> Result<Option<Vec<u8>>> {
    if request.body_length().is_some_and(|len| len as u64 > MAX_BODY_BYTES) {
        return Ok(None);
    }
    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .context("Failed to read request body")?;
    Ok((body.len() as u64 <= MAX_BODY_BYTES).then_some(body))
}
