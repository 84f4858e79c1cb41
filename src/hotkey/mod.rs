//! Hotkey engine
//!
//! Parses shortcut descriptors such as `"mod+shift+k"`, matches them against
//! key presses, and dispatches to bound handlers either directly
//! ([`hotkey_handler`]) or through a focus-gated scoped registration
//! ([`use_hotkeys`]).

mod dispatch;
mod keys;
mod matcher;
mod scope;

pub use dispatch::{dispatch, hotkey_handler, FocusGate, Handler, HotkeyItem, HotkeyItems, HotkeyOptions};
pub use keys::{parse_hotkey, Hotkey, ModifierSet, RESERVED_TOKENS};
pub use matcher::{hotkey_matcher, is_exact_hotkey, HotkeyMatcher};
pub use scope::{use_default_hotkeys, use_hotkeys, HotkeyScope};
