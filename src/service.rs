//! Hotkey service backing the daemon
//!
//! Owns the event target host UIs dispatch into, the focus-gated scoped
//! registration for the current keymap, and the throttled keymap reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::events::{EventTarget, KeyEvent};
use crate::hotkey::{use_hotkeys, HotkeyScope};
use crate::keymap::{FiredAction, Keymap, KeymapError};
use crate::throttle::{throttle, Throttled};

/// Service shared between the IPC server and signal handlers
pub type SharedService = Arc<Mutex<HotkeyService>>;

/// What asked for a keymap reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadSource {
    Ipc,
    Signal,
}

/// Outcome of dispatching one key-down event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatched {
    /// Actions of the bindings that fired, in declaration order
    pub actions: Vec<String>,
    pub default_prevented: bool,
}

pub struct HotkeyService {
    target: EventTarget<KeyEvent>,
    scope: HotkeyScope<KeyEvent>,
    actions_tx: Sender<FiredAction>,
    actions_rx: Receiver<FiredAction>,
    keymap_path: PathBuf,
    bindings: usize,
    reloads: u64,
}

impl HotkeyService {
    /// Register `keymap` with the focus gate from `config`
    pub fn new(config: &Config, keymap: &Keymap) -> Self {
        let target = EventTarget::new();
        let (actions_tx, actions_rx) = mpsc::channel();
        let scope = use_hotkeys(
            &target,
            keymap.items(actions_tx.clone()),
            Arc::clone(&config.ignore_tags),
            config.trigger_on_content_editable,
        );

        Self {
            target,
            scope,
            actions_tx,
            actions_rx,
            keymap_path: config.keymap_path.clone(),
            bindings: keymap.len(),
            reloads: 0,
        }
    }

    pub fn into_shared(self) -> SharedService {
        Arc::new(Mutex::new(self))
    }

    /// Dispatch a key-down event and collect the actions it fired
    pub fn key_down(&mut self, mut event: KeyEvent) -> Dispatched {
        // Only bindings fired here may report a suppressed default
        event.default_prevented = false;

        // Anything left over belongs to no request
        self.actions_rx.try_iter().for_each(drop);

        self.target.dispatch(&mut event);

        let actions: Vec<String> = self.actions_rx.try_iter().map(|fired| fired.action).collect();
        debug!(key = %event.key, code = %event.code, ?actions, "key down dispatched");

        Dispatched {
            actions,
            default_prevented: event.default_prevented,
        }
    }

    /// Replace the registered bindings with `keymap`
    pub fn apply_keymap(&mut self, keymap: &Keymap) -> usize {
        self.scope.set_items(keymap.items(self.actions_tx.clone()));
        self.bindings = keymap.len();
        self.reloads += 1;
        info!(bindings = self.bindings, reloads = self.reloads, "keymap reloaded");
        self.bindings
    }

    pub fn keymap_path(&self) -> &Path {
        &self.keymap_path
    }

    pub fn bindings(&self) -> usize {
        self.bindings
    }

    pub fn reloads(&self) -> u64 {
        self.reloads
    }
}

pub fn lock(service: &SharedService) -> MutexGuard<'_, HotkeyService> {
    service.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Re-read the keymap file and swap it in.
///
/// The file is read without holding the service lock, so key-down requests
/// keep flowing while the read is in progress.
pub async fn reload_keymap(service: &SharedService) -> Result<usize, KeymapError> {
    let path = lock(service).keymap_path().to_owned();
    let keymap = Keymap::read_or_empty(&path).await?;
    Ok(lock(service).apply_keymap(&keymap))
}

/// Build the rate-limited reload shared by IPC requests and SIGHUP
pub fn reload_throttle(service: &SharedService, window: Duration) -> Throttled<ReloadSource> {
    let service = Arc::clone(service);
    throttle(
        move |source: ReloadSource| {
            let handle = match Handle::try_current() {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(?e, ?source, "no runtime for keymap reload, skipping it");
                    return;
                }
            };

            debug!(?source, "reloading keymap");
            let service = Arc::clone(&service);
            handle.spawn(async move {
                if let Err(e) = reload_keymap(&service).await {
                    error!(?e, ?source, "keymap reload failed, keeping previous bindings");
                }
            });
        },
        window,
    )
}

/// Poll until `service` has completed `count` reloads
#[cfg(test)]
pub(crate) async fn wait_for_reloads(service: &SharedService, count: u64) {
    let wait = async {
        while lock(service).reloads() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(5), wait).await.is_err() {
        panic!("timed out waiting for {count} reloads, saw {}", lock(service).reloads());
    }
}
