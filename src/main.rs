//! keybinderd: hotkey daemon for UI hosts
//!
//! Host UIs forward key-down events over a Unix socket. The daemon matches
//! them against the keymap file, with the focus gate applied, and answers
//! with the actions that fired and whether to suppress the default action.
//!
//! SIGHUP or a `reload_keymap` request re-reads the keymap, at most once per
//! configured window.

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use keybinder::config::Config;
use keybinder::ipc::{Server, ServerState};
use keybinder::keymap::Keymap;
use keybinder::lifecycle::{LifecycleSignal, Signals};
use keybinder::service::{reload_throttle, HotkeyService, ReloadSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "keybinderd starting"
    );

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.keymap_path, "configuration loaded");

    let keymap = Keymap::load_or_empty(&config.keymap_path)
        .context("failed to load keymap")?;
    info!(bindings = keymap.len(), "keymap loaded");

    let service = HotkeyService::new(&config, &keymap).into_shared();
    let reload = reload_throttle(&service, config.reload_throttle);

    let mut signals = Signals::register().context("failed to register signal handlers")?;
    let server = Server::new(&config.socket_path, ServerState::new(service, reload.clone()))?;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = async {
            while signals.next().await == LifecycleSignal::Reload {
                reload.call(ReloadSource::Signal);
            }
        } => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");
    server.shutdown().await;
    info!("keybinderd stopped");

    Ok(())
}
