//! qhotkeys-daemon: system-wide hotkey engine served over IPC
//!
//! This daemon provides:
//! - Global keyboard/wheel observation via the OS input hook
//! - The chord-matching engine (exact-size keydown matching, wheel fan-out)
//! - IPC server so other processes can register hotkeys and be notified

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use qhotkeys::config::Config;
use qhotkeys::events::{bind_chord, HotkeyEvent};
use qhotkeys::hook::RdevHook;
use qhotkeys::ipc::Server;
use qhotkeys::lifecycle::ShutdownSignal;
use qhotkeys::Hotkeys;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "qhotkeys-daemon starting"
    );
    info!(?config.socket_path, bindings = config.bindings.len(), "configuration loaded");
    config.ensure_dirs()?;

    // Create shutdown signal handler
    let mut shutdown = ShutdownSignal::new().context("failed to install signal handlers")?;

    // Engine -> IPC subscribers
    let (event_tx, mut event_rx) = broadcast::channel::<HotkeyEvent>(64);

    // Create the engine over the system input hook
    let hotkeys = Arc::new(Hotkeys::new(Arc::new(RdevHook::new())));
    for combination in &config.bindings {
        bind_chord(&hotkeys, combination.keys(), &event_tx);
        info!(hotkey = %combination, "configured hotkey registered");
    }

    // Start the hook (runs on dedicated thread)
    match hotkeys.run(config.debug) {
        Ok(()) => {
            info!("input hook started");
        }
        Err(e) => {
            error!(?e, "failed to start input hook");
            warn!("continuing without hotkey support - check display access / Accessibility permissions");
        }
    }

    // Create IPC server
    let server = Server::new(&config.socket_path, Arc::clone(&hotkeys), event_tx.clone())?;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Log fired hotkeys
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => info!(%event, "hotkey event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "hotkey event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("hotkey event logger exited");
        }

        // Wait for shutdown signal
        signal = shutdown.wait() => {
            info!(signal, "shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    hotkeys.stop();
    server.shutdown().await;

    info!("qhotkeys-daemon stopped");

    Ok(())
}
