// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Toolkit events and listener tables.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::widgets::WidgetRef;

/// The kind of a toolkit [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventType {
    MouseDown,
    MouseUp,
    MouseEnter,
    MouseExit,
    Paint,
    Move,
    Resize,
    Dispose,
    Selection,
    DefaultSelection,
    Show,
    Hide,
    Close,
    Activate,
    Deactivate,
    Skin,
    Settings,
}

/// A transient event value.
///
/// Events are created per dispatch, consumed synchronously by listeners, and
/// not retained. Listeners may flip [`doit`](Self::doit) to veto the default
/// behavior of vetoable events (currently [`EventType::Close`]).
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    /// The widget that issued the event.
    pub widget: Option<WidgetRef>,
    /// The item within the widget the event applies to, if any.
    pub item: Option<WidgetRef>,
    /// Event-specific detail bits.
    pub detail: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// The mouse button that triggered the event, 1-based.
    pub button: u32,
    /// Milliseconds since the display was created.
    pub time: u64,
    /// Set to `false` by a listener to cancel the default behavior.
    pub doit: bool,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            widget: None,
            item: None,
            detail: 0,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            button: 0,
            time: 0,
            doit: true,
        }
    }
}

/// A toolkit event listener.
///
/// Listeners run on the display thread (unless callback marshaling was turned
/// off) and may freely call back into the toolkit.
pub type Listener = Arc<dyn Fn(&mut Event) + Send + Sync>;

/// Listener registrations for one widget or display, keyed by event type.
#[derive(Default)]
pub(crate) struct EventTable {
    hooks: HashMap<EventType, SmallVec<[Listener; 2]>>,
}

impl EventTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn hook(&mut self, event_type: EventType, listener: Listener) {
        self.hooks.entry(event_type).or_default().push(listener);
    }

    /// Removes a listener by identity. Removing an unregistered listener is a
    /// no-op.
    pub(crate) fn unhook(&mut self, event_type: EventType, listener: &Listener) {
        if let Some(list) = self.hooks.get_mut(&event_type) {
            list.retain(|hooked| !Arc::ptr_eq(hooked, listener));
            if list.is_empty() {
                self.hooks.remove(&event_type);
            }
        }
    }

    pub(crate) fn hooks(&self, event_type: EventType) -> bool {
        self.hooks.contains_key(&event_type)
    }

    /// Snapshot of the listeners for one event type, so they can be invoked
    /// without holding any toolkit lock.
    pub(crate) fn listeners_for(&self, event_type: EventType) -> SmallVec<[Listener; 2]> {
        self.hooks.get(&event_type).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn unhook_removes_by_identity() {
        let mut table = EventTable::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter2 = counter.clone();
        let a: Listener = Arc::new(move |_| {
            counter2.fetch_add(1, Ordering::SeqCst);
        });
        let b: Listener = Arc::new(|_| {});

        table.hook(EventType::Selection, a.clone());
        table.hook(EventType::Selection, b.clone());
        table.unhook(EventType::Selection, &b);

        let listeners = table.listeners_for(EventType::Selection);
        assert_eq!(listeners.len(), 1);
        let mut event = Event::new(EventType::Selection);
        for listener in &listeners {
            listener(&mut event);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        table.unhook(EventType::Selection, &a);
        assert!(!table.hooks(EventType::Selection));
    }
}
