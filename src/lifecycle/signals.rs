//! Unix signal handling: shutdown on SIGTERM/SIGINT, reload on SIGHUP

use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

/// What the daemon should do in response to a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// Stop serving and clean up
    Shutdown,
    /// Re-read the keymap
    Reload,
}

/// Registered signal streams
pub struct Signals {
    sigterm: Signal,
    sigint: Signal,
    sighup: Signal,
}

impl Signals {
    /// Install handlers for SIGTERM, SIGINT and SIGHUP
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
            sighup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next signal
    pub async fn next(&mut self) -> LifecycleSignal {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("received SIGTERM");
                LifecycleSignal::Shutdown
            }
            _ = self.sigint.recv() => {
                debug!("received SIGINT");
                LifecycleSignal::Shutdown
            }
            _ = self.sighup.recv() => {
                debug!("received SIGHUP");
                LifecycleSignal::Reload
            }
        }
    }
}
