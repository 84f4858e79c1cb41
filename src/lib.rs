//! keybinder: declarative keyboard shortcuts for UI hosts
//!
//! The library binds descriptors such as `"mod+shift+k"` to handlers:
//! - [`hotkey::parse_hotkey`] turns a descriptor into modifiers plus a key
//! - [`hotkey::hotkey_matcher`] / [`hotkey::is_exact_hotkey`] test key presses
//! - [`hotkey::hotkey_handler`] dispatches to every matching binding
//! - [`hotkey::use_hotkeys`] does the same behind a focus gate, for as long
//!   as the returned scope lives
//!
//! [`throttle::throttle`] is a separate trailing-edge rate limiter for
//! event handlers. The remaining modules back the `keybinderd` daemon.

pub mod config;
pub mod events;
pub mod hotkey;
pub mod ipc;
pub mod keymap;
pub mod lifecycle;
pub mod service;
pub mod throttle;

pub use events::{Element, EventTarget, KeyEvent, KeyboardEvent};
pub use hotkey::{
    hotkey_handler, hotkey_matcher, parse_hotkey, use_hotkeys, FocusGate, Hotkey, HotkeyItem,
    HotkeyOptions, HotkeyScope, ModifierSet,
};
pub use throttle::{throttle, Throttled};
