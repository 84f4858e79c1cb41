//! Keymap file loading
//!
//! A keymap is a JSON array of bindings from descriptor to action name:
//!
//! ```json
//! [
//!   { "keys": "mod+k", "action": "open_palette" },
//!   { "keys": "shift+?", "action": "show_help", "preventDefault": false }
//! ]
//! ```
//!
//! Descriptors are taken as written; a bad one simply never fires.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::KeyEvent;
use crate::hotkey::{HotkeyItem, HotkeyItems, HotkeyOptions};

/// Errors that can occur while loading a keymap
#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("failed to read keymap {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keymap JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_prevent_default() -> bool {
    true
}

/// One binding in a keymap file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeymapEntry {
    /// Hotkey descriptor, e.g. `"mod+shift+k"`
    pub keys: String,
    /// Name reported when the binding fires
    pub action: String,
    #[serde(default = "default_prevent_default")]
    pub prevent_default: bool,
}

/// Action reported by a keymap handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredAction {
    pub action: String,
    pub keys: String,
}

/// Ordered list of keymap bindings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap {
    entries: Vec<KeymapEntry>,
}

impl Keymap {
    pub fn new(entries: Vec<KeymapEntry>) -> Self {
        Self { entries }
    }

    /// Load a keymap from a JSON file
    pub fn load(path: &Path) -> Result<Self, KeymapError> {
        let contents = std::fs::read_to_string(path).map_err(|source| KeymapError::Read {
            path: path.to_owned(),
            source,
        })?;
        let keymap = Self::from_json(&contents)?;
        debug!(?path, bindings = keymap.len(), "keymap loaded");
        Ok(keymap)
    }

    /// Load a keymap, falling back to an empty one if the file is missing
    pub fn load_or_empty(path: &Path) -> Result<Self, KeymapError> {
        Self::or_empty(Self::load(path), path)
    }

    /// Read a keymap file without blocking the runtime
    pub async fn read(path: &Path) -> Result<Self, KeymapError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| KeymapError::Read {
                path: path.to_owned(),
                source,
            })?;
        let keymap = Self::from_json(&contents)?;
        debug!(?path, bindings = keymap.len(), "keymap read");
        Ok(keymap)
    }

    /// [`Keymap::read`] with the same missing-file fallback as [`Keymap::load_or_empty`]
    pub async fn read_or_empty(path: &Path) -> Result<Self, KeymapError> {
        Self::or_empty(Self::read(path).await, path)
    }

    fn or_empty(result: Result<Self, KeymapError>, path: &Path) -> Result<Self, KeymapError> {
        match result {
            Err(KeymapError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!(?path, "keymap file not found, starting with no bindings");
                Ok(Self::default())
            }
            result => result,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, KeymapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn entries(&self) -> &[KeymapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build hotkey bindings that report each entry's action to `sink`
    pub fn items(&self, sink: Sender<FiredAction>) -> HotkeyItems<KeyEvent> {
        self.entries
            .iter()
            .map(|entry| {
                let sink = sink.clone();
                let fired = FiredAction {
                    action: entry.action.clone(),
                    keys: entry.keys.clone(),
                };
                HotkeyItem::with_options(
                    entry.keys.clone(),
                    move |_: &KeyEvent| {
                        if sink.send(fired.clone()).is_err() {
                            warn!(action = %fired.action, "action receiver dropped");
                        }
                    },
                    HotkeyOptions {
                        prevent_default: entry.prevent_default,
                    },
                )
            })
            .collect()
    }
}
