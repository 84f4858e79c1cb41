//! Scoped, focus-gated hotkey registration
//!
//! A [`HotkeyScope`] owns one listener on an [`EventTarget`] for as long as
//! it lives. Dropping it detaches the listener, whatever the exit path.

use std::sync::Arc;

use tracing::debug;

use crate::events::{off, on, EventTarget, KeyboardEvent, ListenerId};

use super::dispatch::{dispatch, FocusGate, HotkeyItems};

/// Live registration created by [`use_hotkeys`]
pub struct HotkeyScope<E: KeyboardEvent + 'static> {
    target: EventTarget<E>,
    listener: ListenerId,
    items: HotkeyItems<E>,
    gate: FocusGate,
}

/// Attach `items` to `target`, suppressing them while focus is in an element
/// whose tag is in `tags_to_ignore` or that is content-editable (unless
/// `trigger_on_content_editable` is set).
pub fn use_hotkeys<E: KeyboardEvent + 'static>(
    target: &EventTarget<E>,
    items: HotkeyItems<E>,
    tags_to_ignore: Arc<[String]>,
    trigger_on_content_editable: bool,
) -> HotkeyScope<E> {
    let gate = FocusGate::new(tags_to_ignore, trigger_on_content_editable);
    let listener = attach(target, &items, &gate);

    HotkeyScope {
        target: target.clone(),
        listener,
        items,
        gate,
    }
}

/// [`use_hotkeys`] with the default ignore list and no content-editable firing
pub fn use_default_hotkeys<E: KeyboardEvent + 'static>(
    target: &EventTarget<E>,
    items: HotkeyItems<E>,
) -> HotkeyScope<E> {
    use_hotkeys(target, items, FocusGate::default_ignored_tags(), false)
}

fn attach<E: KeyboardEvent + 'static>(
    target: &EventTarget<E>,
    items: &HotkeyItems<E>,
    gate: &FocusGate,
) -> ListenerId {
    let items = Arc::clone(items);
    let gate = gate.clone();
    let id = on(
        target,
        Arc::new(move |event: &mut E| {
            dispatch(&items, event, Some(&gate));
        }),
    );
    debug!(%id, "hotkey listener attached");
    id
}

impl<E: KeyboardEvent + 'static> HotkeyScope<E> {
    /// Replace the registration if any dependency changed identity.
    ///
    /// `items` and `tags_to_ignore` are compared by pointer, the flag by
    /// value. Returns true when the listener was replaced.
    pub fn update(
        &mut self,
        items: HotkeyItems<E>,
        tags_to_ignore: Arc<[String]>,
        trigger_on_content_editable: bool,
    ) -> bool {
        let unchanged = Arc::ptr_eq(&self.items, &items)
            && Arc::ptr_eq(&self.gate.tags_to_ignore, &tags_to_ignore)
            && self.gate.trigger_on_content_editable == trigger_on_content_editable;
        if unchanged {
            return false;
        }

        off(&self.target, self.listener);
        debug!(id = %self.listener, "hotkey listener detached for re-registration");

        self.items = items;
        self.gate = FocusGate::new(tags_to_ignore, trigger_on_content_editable);
        self.listener = attach(&self.target, &self.items, &self.gate);
        true
    }

    /// Replace only the binding list, keeping the current focus gate
    pub fn set_items(&mut self, items: HotkeyItems<E>) -> bool {
        let tags = Arc::clone(&self.gate.tags_to_ignore);
        let flag = self.gate.trigger_on_content_editable;
        self.update(items, tags, flag)
    }

    pub fn items(&self) -> &HotkeyItems<E> {
        &self.items
    }

    pub fn gate(&self) -> &FocusGate {
        &self.gate
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }
}

impl<E: KeyboardEvent + 'static> Drop for HotkeyScope<E> {
    fn drop(&mut self) {
        off(&self.target, self.listener);
        debug!(id = %self.listener, "hotkey listener detached");
    }
}
