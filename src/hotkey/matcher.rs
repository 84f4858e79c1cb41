//! Exact matching of a parsed hotkey against a key-press event

use std::sync::Arc;

use crate::events::KeyboardEvent;

use super::keys::{parse_hotkey, Hotkey};

/// Prefix the host puts on physical letter-key codes (`KeyK`)
const PHYSICAL_KEY_PREFIX: &str = "Key";

/// Predicate produced by [`hotkey_matcher`]
pub type HotkeyMatcher<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Check whether `event` is exactly the key press `hotkey` describes.
///
/// Every modifier must match exactly, except that `mod` accepts Control or
/// Meta. The key is compared case-insensitively against both the rendered
/// key and the physical code, so layouts that report an unexpected `key`
/// still match on `code`.
pub fn is_exact_hotkey<E: KeyboardEvent + ?Sized>(hotkey: &Hotkey, event: &E) -> bool {
    let modifiers = &hotkey.modifiers;

    if modifiers.alt != event.alt_key() {
        return false;
    }

    if modifiers.r#mod {
        if !event.ctrl_key() && !event.meta_key() {
            return false;
        }
    } else {
        if modifiers.ctrl != event.ctrl_key() {
            return false;
        }
        if modifiers.meta != event.meta_key() {
            return false;
        }
    }

    if modifiers.shift != event.shift_key() {
        return false;
    }

    // A descriptor must name a key; an empty token counts as none
    let key = match hotkey.key.as_deref() {
        Some(key) if !key.is_empty() => key.to_lowercase(),
        _ => return false,
    };

    let code = event.code();
    let physical = code.strip_prefix(PHYSICAL_KEY_PREFIX).unwrap_or(code);

    event.key().to_lowercase() == key || physical.to_lowercase() == key
}

/// Build a predicate for `descriptor`
pub fn hotkey_matcher<E: KeyboardEvent>(descriptor: &str) -> HotkeyMatcher<E> {
    let hotkey = parse_hotkey(descriptor);
    Arc::new(move |event: &E| is_exact_hotkey(&hotkey, event))
}
