//! Keyboard event abstraction
//!
//! The matching engine never touches a concrete UI runtime's event object.
//! Hosts implement [`KeyboardEvent`] for their own event type, or forward
//! plain [`KeyEvent`] values (which is what the IPC server does).

mod target;

use serde::{Deserialize, Serialize};

pub use target::{off, on, EventTarget, Listener, ListenerId};

/// Minimal capability set the hotkey engine needs from a key-press event
pub trait KeyboardEvent {
    fn alt_key(&self) -> bool;
    fn ctrl_key(&self) -> bool;
    fn meta_key(&self) -> bool;
    fn shift_key(&self) -> bool;

    /// Rendered character or key name, e.g. `"k"`, `"K"`, `"Enter"`
    fn key(&self) -> &str;

    /// Physical key identifier, e.g. `"KeyK"`, `"Digit1"`
    fn code(&self) -> &str;

    /// Element the event was dispatched to.
    ///
    /// `None` when there is no target or the target is not an element.
    fn target(&self) -> Option<&Element>;

    /// Suppress the host's default action for this event
    fn prevent_default(&mut self);
}

/// Element that had focus when the key was pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Tag name as reported by the host (uppercase for HTML, e.g. `INPUT`)
    pub tag_name: String,

    /// Whether the element accepts free-form text editing
    #[serde(default)]
    pub is_content_editable: bool,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            is_content_editable: false,
        }
    }

    pub fn content_editable(mut self) -> Self {
        self.is_content_editable = true;
        self
    }
}

/// Plain-data key-down event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    pub key: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub target: Option<Element>,
    #[serde(default)]
    pub default_prevented: bool,
}

impl KeyEvent {
    /// Create an event for `key` with no modifiers, code or target
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn with_target(mut self, target: Element) -> Self {
        self.target = Some(target);
        self
    }
}

impl KeyboardEvent for KeyEvent {
    fn alt_key(&self) -> bool {
        self.alt_key
    }

    fn ctrl_key(&self) -> bool {
        self.ctrl_key
    }

    fn meta_key(&self) -> bool {
        self.meta_key
    }

    fn shift_key(&self) -> bool {
        self.shift_key
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"ctrlKey":true,"key":"k","code":"KeyK","target":{"tagName":"INPUT"}}"#;
        let event: KeyEvent = serde_json::from_str(json).unwrap();
        assert!(event.ctrl_key());
        assert!(!event.alt_key());
        assert_eq!(event.code(), "KeyK");
        assert_eq!(event.target(), Some(&Element::new("INPUT")));
        assert!(!event.default_prevented);
    }

    #[test]
    fn test_event_serialization() {
        let event = KeyEvent::new("s").with_meta();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"metaKey\":true"));
        assert!(json.contains("\"defaultPrevented\":false"));
    }

    #[test]
    fn test_prevent_default() {
        let mut event = KeyEvent::new("a");
        event.prevent_default();
        assert!(event.default_prevented);
    }
}
