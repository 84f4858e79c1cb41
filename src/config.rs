//! Configuration loading and management

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::hotkey::FocusGate;

const DEFAULT_RELOAD_THROTTLE_MS: u64 = 500;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// JSON keymap file
    pub keymap_path: PathBuf,

    /// Tag names that suppress shortcuts while focused
    pub ignore_tags: Arc<[String]>,

    /// Fire shortcuts inside content-editable elements
    pub trigger_on_content_editable: bool,

    /// Minimum spacing between keymap reloads
    pub reload_throttle: Duration,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let home = var("HOME").map(PathBuf::from);
        let home_path = |parts: &[&str]| -> Result<PathBuf> {
            let home = home.clone().context("HOME is not set")?;
            Ok(parts.iter().fold(home, |path, part| path.join(part)))
        };

        let socket_path = match var("KEYBINDER_SOCKET") {
            Some(path) => PathBuf::from(path),
            None => home_path(&[".local", "share", "keybinder", "keybinder.sock"])?,
        };

        let keymap_path = match var("KEYBINDER_KEYMAP") {
            Some(path) => PathBuf::from(path),
            None => home_path(&[".config", "keybinder", "keymap.json"])?,
        };

        let ignore_tags = match var("KEYBINDER_IGNORE_TAGS") {
            Some(tags) => parse_tag_list(&tags),
            None => FocusGate::default_ignored_tags(),
        };

        let trigger_on_content_editable = var("KEYBINDER_CONTENT_EDITABLE")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let reload_throttle_ms = match var("KEYBINDER_RELOAD_THROTTLE_MS") {
            Some(ms) => ms
                .trim()
                .parse()
                .with_context(|| format!("invalid KEYBINDER_RELOAD_THROTTLE_MS: {ms}"))?,
            None => DEFAULT_RELOAD_THROTTLE_MS,
        };

        Ok(Self {
            socket_path,
            keymap_path,
            ignore_tags,
            trigger_on_content_editable,
            reload_throttle: Duration::from_millis(reload_throttle_ms),
        })
    }

    /// Ensure the socket directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        Ok(())
    }
}

/// Comma-separated tag names, uppercased; blank entries are skipped
fn parse_tag_list(tags: &str) -> Arc<[String]> {
    tags.split(',')
        .map(|tag| tag.trim().to_uppercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
