//! `huddle` binary: load settings, start the hub, serve until signalled.

mod cli;

use anyhow::Context;
use clap::Parser;
use huddle_server::{AppState, Hub, router, serve};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::Args;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => huddle_settings::load_settings_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => huddle_settings::load_settings().context("loading settings")?,
    };
    args.apply(&mut settings);

    huddle_core::logging::init_subscriber(&settings.logging.level, settings.logging.json)
        .context("initializing logging")?;

    let metrics = if settings.server.metrics_enabled {
        Some(huddle_server::metrics::install_recorder().context("installing metrics recorder")?)
    } else {
        None
    };

    let (hub, hub_task) = Hub::spawn(settings.hub.inbox_capacity);
    let state = AppState {
        hub,
        outbound_capacity: settings.hub.outbound_capacity,
        metrics,
    };
    let app = router(state, &settings.server.ws_path);

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        %addr,
        ws_path = %settings.server.ws_path,
        version = env!("CARGO_PKG_VERSION"),
        "huddle starting"
    );

    serve(listener, app, shutdown_signal())
        .await
        .context("serving")?;

    // Open sockets keep their handles alive, so the hub is not awaited.
    hub_task.abort();
    info!("huddle stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                let _ = term.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
