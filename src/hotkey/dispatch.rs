//! Dispatching key presses to bound handlers
//!
//! One evaluator serves both entry points: [`hotkey_handler`] fires on every
//! match, while scoped registrations pass a [`FocusGate`] so shortcuts stay
//! quiet while the user is typing.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::events::{KeyboardEvent, Listener};

use super::keys::{parse_hotkey, Hotkey};
use super::matcher::is_exact_hotkey;

/// Callback bound to a hotkey
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered binding list shared between a registration and its listener
pub type HotkeyItems<E> = Arc<[HotkeyItem<E>]>;

/// Per-binding options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyOptions {
    /// Suppress the host's default action when the binding fires
    pub prevent_default: bool,
}

impl Default for HotkeyOptions {
    fn default() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// A descriptor bound to a handler
pub struct HotkeyItem<E> {
    descriptor: String,
    hotkey: Hotkey,
    handler: Handler<E>,
    options: HotkeyOptions,
}

impl<E> HotkeyItem<E> {
    /// Bind `descriptor` to `handler` with default options
    pub fn new<F>(descriptor: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        Self::with_options(descriptor, handler, HotkeyOptions::default())
    }

    pub fn with_options<F>(descriptor: impl Into<String>, handler: F, options: HotkeyOptions) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let descriptor = descriptor.into();
        Self {
            hotkey: parse_hotkey(&descriptor),
            descriptor,
            handler: Arc::new(handler),
            options,
        }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn hotkey(&self) -> &Hotkey {
        &self.hotkey
    }

    pub fn options(&self) -> HotkeyOptions {
        self.options
    }
}

impl<E> Clone for HotkeyItem<E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            hotkey: self.hotkey.clone(),
            handler: Arc::clone(&self.handler),
            options: self.options,
        }
    }
}

impl<E> fmt::Debug for HotkeyItem<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeyItem")
            .field("descriptor", &self.descriptor)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Suppresses shortcuts while focus is in a text-entry element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusGate {
    /// Tag names whose focus blocks shortcuts, compared exactly
    pub tags_to_ignore: Arc<[String]>,
    /// Fire even when the target is content-editable
    pub trigger_on_content_editable: bool,
}

impl FocusGate {
    pub const DEFAULT_IGNORED_TAGS: [&'static str; 3] = ["INPUT", "TEXTAREA", "SELECT"];

    pub fn new(tags_to_ignore: Arc<[String]>, trigger_on_content_editable: bool) -> Self {
        Self {
            tags_to_ignore,
            trigger_on_content_editable,
        }
    }

    pub fn default_ignored_tags() -> Arc<[String]> {
        Self::DEFAULT_IGNORED_TAGS
            .iter()
            .map(|tag| tag.to_string())
            .collect()
    }

    /// Check if a matched shortcut may fire for `event`.
    ///
    /// Events without an element target always pass.
    pub fn should_fire<E: KeyboardEvent + ?Sized>(&self, event: &E) -> bool {
        let Some(element) = event.target() else {
            return true;
        };

        if !self.trigger_on_content_editable && element.is_content_editable {
            return false;
        }

        !self.tags_to_ignore.iter().any(|tag| *tag == element.tag_name)
    }
}

impl Default for FocusGate {
    fn default() -> Self {
        Self::new(Self::default_ignored_tags(), false)
    }
}

/// Run every matching binding, in order, against `event`.
///
/// Returns how many handlers fired.
pub fn dispatch<E: KeyboardEvent>(items: &[HotkeyItem<E>], event: &mut E, gate: Option<&FocusGate>) -> usize {
    let mut fired = 0;

    for item in items {
        if !is_exact_hotkey(&item.hotkey, &*event) {
            continue;
        }

        if let Some(gate) = gate {
            if !gate.should_fire(&*event) {
                debug!(descriptor = %item.descriptor, "hotkey suppressed by focus gate");
                continue;
            }
        }

        if item.options.prevent_default {
            event.prevent_default();
        }

        debug!(descriptor = %item.descriptor, "hotkey fired");
        (item.handler)(&*event);
        fired += 1;
    }

    fired
}

/// Build a listener that fires every matching binding, with no focus gate
pub fn hotkey_handler<E>(items: impl Into<HotkeyItems<E>>) -> Listener<E>
where
    E: KeyboardEvent + 'static,
{
    let items: HotkeyItems<E> = items.into();
    Arc::new(move |event: &mut E| {
        dispatch(&items, event, None);
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::events::{Element, KeyEvent};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn record(log: &Log, name: &'static str) -> impl Fn(&KeyEvent) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |_| log.lock().unwrap().push(name)
    }

    #[test]
    fn test_all_matches_fire_in_order() {
        let log: Log = Arc::default();
        let items = vec![
            HotkeyItem::new("a", record(&log, "h1")),
            HotkeyItem::new("b", record(&log, "other")),
            HotkeyItem::new("a", record(&log, "h2")),
        ];
        let handler = hotkey_handler(items);

        let mut event = KeyEvent::new("a");
        handler(&mut event);

        assert_eq!(*log.lock().unwrap(), vec!["h1", "h2"]);
    }

    #[test]
    fn test_prevent_default_by_default() {
        let log: Log = Arc::default();
        let items = vec![HotkeyItem::new("mod+s", record(&log, "save"))];

        let mut event = KeyEvent::new("s").with_meta();
        assert_eq!(dispatch(&items, &mut event, None), 1);
        assert!(event.default_prevented);
    }

    #[test]
    fn test_prevent_default_opt_out() {
        let log: Log = Arc::default();
        let items = vec![HotkeyItem::with_options(
            "mod+s",
            record(&log, "save"),
            HotkeyOptions {
                prevent_default: false,
            },
        )];

        let mut event = KeyEvent::new("s").with_ctrl();
        dispatch(&items, &mut event, None);
        assert!(!event.default_prevented);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_no_match_leaves_event_untouched() {
        let log: Log = Arc::default();
        let items = vec![HotkeyItem::new("ctrl+k", record(&log, "k"))];

        let mut event = KeyEvent::new("k");
        assert_eq!(dispatch(&items, &mut event, None), 0);
        assert!(!event.default_prevented);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ungated_handler_fires_in_inputs() {
        let log: Log = Arc::default();
        let handler = hotkey_handler(vec![HotkeyItem::new("a", record(&log, "a"))]);

        let mut event = KeyEvent::new("a").with_target(Element::new("INPUT"));
        handler(&mut event);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_focus_gate_default_tags() {
        let gate = FocusGate::default();
        assert!(!gate.should_fire(&KeyEvent::new("a").with_target(Element::new("INPUT"))));
        assert!(!gate.should_fire(&KeyEvent::new("a").with_target(Element::new("TEXTAREA"))));
        assert!(!gate.should_fire(&KeyEvent::new("a").with_target(Element::new("SELECT"))));
        assert!(gate.should_fire(&KeyEvent::new("a").with_target(Element::new("DIV"))));
        assert!(gate.should_fire(&KeyEvent::new("a")));
    }

    #[test]
    fn test_focus_gate_empty_ignore_list() {
        let gate = FocusGate::new(Arc::from(Vec::new()), false);
        assert!(gate.should_fire(&KeyEvent::new("a").with_target(Element::new("INPUT"))));
    }

    #[test]
    fn test_focus_gate_content_editable() {
        let editable = KeyEvent::new("a").with_target(Element::new("DIV").content_editable());
        assert!(!FocusGate::default().should_fire(&editable));

        let permissive = FocusGate::new(FocusGate::default_ignored_tags(), true);
        assert!(permissive.should_fire(&editable));

        // Ignored tags still block when content-editable firing is allowed
        let input = KeyEvent::new("a").with_target(Element::new("INPUT").content_editable());
        assert!(!permissive.should_fire(&input));
    }

    #[test]
    fn test_gated_dispatch_skips_prevent_default() {
        let log: Log = Arc::default();
        let items = vec![HotkeyItem::new("a", record(&log, "a"))];

        let mut event = KeyEvent::new("a").with_target(Element::new("INPUT"));
        assert_eq!(dispatch(&items, &mut event, Some(&FocusGate::default())), 0);
        assert!(!event.default_prevented);
    }
}
