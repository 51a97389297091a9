// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The widget core: identity, per-widget state, and the capability traits.
//!
//! Widgets are handles. All tree state lives in the owning display, keyed by
//! [`WidgetId`]; the public widget types (`Shell`, `Button`, ...) are thin
//! wrappers around a [`WidgetHandle`] and get their behavior from the
//! [`Widget`], [`Control`] and [`Container`] traits.
//!
//! Every state-reading or state-mutating operation asserts two things before
//! doing anything else: the widget is not disposed, and the calling thread is
//! the thread that created the owning display. Violations surface as
//! [`Error::WidgetDisposed`] and [`Error::ThreadInvalidAccess`]
//! respectively.
//!
//! [`Error::WidgetDisposed`]: crate::core::Error::WidgetDisposed
//! [`Error::ThreadInvalidAccess`]: crate::core::Error::ThreadInvalidAccess

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::app::Display;
use crate::core::{
    Error, Event, EventTable, EventType, Layout, LayoutFlags, Listener, Point, Rect, Result, Size,
    Style,
};
use crate::remote::api::{self, InvalidateFlags, RemoteObject};
use crate::remote::{
    RemoteButton, RemoteCanvas, RemoteControl, RemoteLabel, RemoteProgressBar, RemoteText,
    RemoteWindow,
};

// --- MARK: IDENTITY

/// Unique identity of a widget within its process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(NonZeroU64);

impl WidgetId {
    pub(crate) fn next() -> Self {
        static WIDGET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        let id = WIDGET_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(id.try_into().unwrap())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A widget's address: its display plus its id.
#[derive(Clone)]
pub struct WidgetHandle {
    pub(crate) display: Display,
    pub(crate) id: WidgetId,
}

impl fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetHandle").field("id", &self.id).finish()
    }
}

// --- MARK: PER-WIDGET STATE

bitflags! {
    /// Internal widget state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct WidgetFlags: u32 {
        /// Dispose has started; the Dispose event must not be re-sent.
        const DISPOSE_SENT = 1 << 0;
        /// The widget's layout must run on the next layout pass.
        const LAYOUT_NEEDED = 1 << 1;
        /// Cached layout data must be discarded when the layout runs.
        const LAYOUT_CHANGED = 1 << 2;
        /// A descendant inside a deferred scope requested layout.
        const LAYOUT_CHILD = 1 << 3;
        /// The widget is queued for the skin pass.
        const SKIN_NEEDED = 1 << 4;
        /// The shell has been opened.
        const OPENED = 1 << 5;
    }
}

/// What kind of widget a [`WidgetData`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WidgetKind {
    Shell,
    Composite,
    Button,
    Label,
    Text,
    ProgressBar,
    Canvas,
    TabFolder,
    TabItem,
}

/// The remote wrapper owned by a widget.
///
/// Exactly one per widget; [`WidgetKind::TabItem`] is the only kind without
/// a remote peer of its own.
pub(crate) enum RemoteHandle {
    Window(RemoteWindow),
    Button(RemoteButton),
    Label(RemoteLabel),
    Text(RemoteText),
    Progress(RemoteProgressBar),
    Canvas(RemoteCanvas),
    None,
}

impl RemoteHandle {
    pub(crate) fn as_control(&self) -> Option<&dyn RemoteControl> {
        match self {
            Self::Window(wrapper) => Some(wrapper),
            Self::Button(wrapper) => Some(wrapper),
            Self::Label(wrapper) => Some(wrapper),
            Self::Text(wrapper) => Some(wrapper),
            Self::Progress(wrapper) => Some(wrapper),
            Self::Canvas(wrapper) => Some(wrapper),
            Self::None => None,
        }
    }

    pub(crate) fn as_control_mut(&mut self) -> Option<&mut dyn RemoteControl> {
        match self {
            Self::Window(wrapper) => Some(wrapper),
            Self::Button(wrapper) => Some(wrapper),
            Self::Label(wrapper) => Some(wrapper),
            Self::Text(wrapper) => Some(wrapper),
            Self::Progress(wrapper) => Some(wrapper),
            Self::Canvas(wrapper) => Some(wrapper),
            Self::None => None,
        }
    }

    /// The realized peer's window object, cloned so remote calls can run
    /// without holding the display lock.
    pub(crate) fn window_object(&self) -> Result<RemoteObject> {
        self.as_control()
            .ok_or(Error::NoHandles("widget has no remote peer"))?
            .window_object()
    }

    /// The peer used as parent when realizing child peers.
    pub(crate) fn peer_object(&self) -> Result<RemoteObject> {
        self.as_control()
            .ok_or(Error::NoHandles("widget has no remote peer"))?
            .peer_object()
    }

    /// The model object behind a factory-created control.
    pub(crate) fn model_object(&self) -> Result<RemoteObject> {
        match self {
            Self::Button(wrapper) => Ok(wrapper.model_object().clone()),
            Self::Label(wrapper) => Ok(wrapper.model_object().clone()),
            Self::Text(wrapper) => Ok(wrapper.model_object().clone()),
            Self::Progress(wrapper) => Ok(wrapper.model_object().clone()),
            _ => Err(Error::Unsupported("widget has no remote model")),
        }
    }
}

/// Display-owned state of one widget.
pub(crate) struct WidgetData {
    pub(crate) kind: WidgetKind,
    pub(crate) remote: RemoteHandle,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: SmallVec<[WidgetId; 8]>,
    pub(crate) style: Style,
    pub(crate) flags: WidgetFlags,
    pub(crate) listeners: EventTable,
    pub(crate) layout: Option<Box<dyn Layout>>,
    pub(crate) layout_count: u32,
    /// Local text cache: shell titles and tab-item labels, which have no
    /// remote representation.
    pub(crate) text: String,
    /// Selected tab index; meaningful for tab folders only.
    pub(crate) selection: i32,
    /// The control a tab item presents; meaningful for tab items only.
    pub(crate) item_control: Option<WidgetId>,
}

impl WidgetData {
    pub(crate) fn new(kind: WidgetKind, remote: RemoteHandle, style: Style) -> Self {
        Self {
            kind,
            remote,
            parent: None,
            children: SmallVec::new(),
            style,
            flags: WidgetFlags::SKIN_NEEDED,
            listeners: EventTable::new(),
            layout: None,
            layout_count: 0,
            text: String::new(),
            selection: -1,
            item_control: None,
        }
    }
}

// --- MARK: SEALED HANDLE ACCESS

#[doc(hidden)]
pub mod sealed {
    use super::WidgetHandle;

    /// Implemented by every widget type; not part of the public contract.
    pub trait HasHandle {
        fn handle(&self) -> &WidgetHandle;
    }
}

use sealed::HasHandle;

// --- MARK: WIDGET

/// Operations common to every widget.
pub trait Widget: HasHandle {
    fn display(&self) -> &Display {
        &self.handle().display
    }

    fn id(&self) -> WidgetId {
        self.handle().id
    }

    /// `true` once [`dispose`](Self::dispose) has completed. Never raises;
    /// this is the one query allowed on a dead widget from any thread.
    fn is_disposed(&self) -> bool {
        let handle = self.handle();
        !handle.display.core().widget_exists(handle.id)
    }

    /// Disposes the widget, its children, and its remote peer.
    ///
    /// Sends the Dispose event while the widget is still alive, then releases
    /// the remote peer and removes the identity mapping. Idempotent: a second
    /// call is a no-op. Must be called from the display thread.
    fn dispose(&self) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_thread()?;
        if self.is_disposed() {
            return Ok(());
        }
        handle.display.core().dispose_widget(handle.id)
    }

    fn style(&self) -> Result<Style> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle
            .display
            .core()
            .with_widget(handle.id, |data| Ok(data.style))
    }

    fn add_listener(&self, event_type: EventType, listener: Listener) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle.display.core().with_widget(handle.id, |data| {
            data.listeners.hook(event_type, listener);
            Ok(())
        })
    }

    fn remove_listener(&self, event_type: EventType, listener: &Listener) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle.display.core().with_widget(handle.id, |data| {
            data.listeners.unhook(event_type, listener);
            Ok(())
        })
    }

    /// Sends `event` to this widget's listeners synchronously, after the
    /// display's filters.
    fn notify_listeners(&self, event_type: EventType, event: &mut Event) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        event.event_type = event_type;
        handle.display.core().send_widget_event(handle.id, event);
        Ok(())
    }

    /// A type-erased reference to this widget.
    fn as_widget(&self) -> WidgetRef {
        WidgetRef {
            handle: self.handle().clone(),
        }
    }
}

// --- MARK: CONTROL

/// Operations common to widgets backed by a remote peer with geometry.
pub trait Control: Widget {
    fn parent(&self) -> Result<Option<ContainerRef>> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        let parent = handle
            .display
            .core()
            .with_widget(handle.id, |data| Ok(data.parent))?;
        Ok(parent.map(|id| ContainerRef {
            handle: WidgetHandle {
                display: handle.display.clone(),
                id,
            },
        }))
    }

    /// The receiver's nearest ancestor shell (or itself, for shells).
    fn shell(&self) -> Result<crate::widgets::Shell> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        let shell_id = handle.display.core().shell_of(handle.id)?;
        Ok(crate::widgets::Shell::from_handle(WidgetHandle {
            display: handle.display.clone(),
            id: shell_id,
        }))
    }

    /// One remote round trip; no local cache is kept authoritative.
    fn bounds(&self) -> Result<Rect> {
        let window = self.checked_window_object()?;
        Ok(api::window(&window)?.pos_size()?)
    }

    fn set_bounds(&self, bounds: Rect) -> Result<()> {
        let window = self.checked_window_object()?;
        api::window(&window)?.set_pos_size(
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            api::PosSizeFlags::POSSIZE,
        )?;
        Ok(())
    }

    fn location(&self) -> Result<Point> {
        Ok(self.bounds()?.location())
    }

    /// Read-modify-write over the full bounds; safe because all geometry
    /// calls originate from the display thread.
    fn set_location(&self, x: i32, y: i32) -> Result<()> {
        let current = self.bounds()?;
        self.set_bounds(Rect::new(x, y, current.width, current.height))
    }

    fn size(&self) -> Result<Size> {
        Ok(self.bounds()?.size())
    }

    fn set_size(&self, width: i32, height: i32) -> Result<()> {
        let current = self.bounds()?;
        self.set_bounds(Rect::new(current.x, current.y, width, height))
    }

    fn set_visible(&self, visible: bool) -> Result<()> {
        let window = self.checked_window_object()?;
        api::window(&window)?.set_visible(visible)?;
        Ok(())
    }

    /// Reads visibility back from the remote peer.
    fn is_visible(&self) -> Result<bool> {
        let window = self.checked_window_object()?;
        Ok(api::window(&window)?.visible()?)
    }

    /// Enablement lives on the remote model; window-backed widgets have no
    /// model and report [`Error::Unsupported`].
    ///
    /// [`Error::Unsupported`]: crate::core::Error::Unsupported
    fn set_enabled(&self, enabled: bool) -> Result<()> {
        let model = self.checked_model_object()?;
        api::property_set(&model)?.set_property_value("Enabled", enabled.into())?;
        Ok(())
    }

    fn is_enabled(&self) -> Result<bool> {
        let model = self.checked_model_object()?;
        let value = api::property_set(&model)?.property_value("Enabled")?;
        Ok(value.as_bool().unwrap_or(true))
    }

    /// Asks the remote peer to repaint.
    fn redraw(&self) -> Result<()> {
        let window = self.checked_window_object()?;
        api::peer(&window)?.invalidate(InvalidateFlags::NOERASE)?;
        Ok(())
    }

    /// Schedules a deferred layout of the receiver's ancestor path.
    fn request_layout(&self) -> Result<()> {
        let shell = self.shell()?;
        let this = ControlRef {
            handle: self.handle().clone(),
        };
        let changed: [&dyn Control; 1] = [&this];
        shell.layout_controls(&changed, LayoutFlags::DEFER)
    }

    /// A type-erased reference to this control.
    fn as_control_ref(&self) -> ControlRef {
        ControlRef {
            handle: self.handle().clone(),
        }
    }

    #[doc(hidden)]
    fn checked_window_object(&self) -> Result<RemoteObject> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle
            .display
            .core()
            .with_widget(handle.id, |data| data.remote.window_object())
    }

    #[doc(hidden)]
    fn checked_model_object(&self) -> Result<RemoteObject> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle
            .display
            .core()
            .with_widget(handle.id, |data| data.remote.model_object())
    }
}

// --- MARK: CONTAINER

/// Operations common to widgets that hold children and run layouts.
pub trait Container: Control {
    /// The receiver's child controls, in creation order.
    fn children(&self) -> Result<Vec<ControlRef>> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        let ids = handle.display.core().child_controls(handle.id)?;
        Ok(ids
            .into_iter()
            .map(|id| ControlRef {
                handle: WidgetHandle {
                    display: handle.display.clone(),
                    id,
                },
            })
            .collect())
    }

    fn set_layout(&self, layout: Box<dyn Layout>) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle.display.core().with_widget(handle.id, |data| {
            data.layout = Some(layout);
            Ok(())
        })
    }

    /// Lays out the receiver's children, discarding cached layout data.
    fn layout(&self) -> Result<()> {
        self.layout_with(true, false)
    }

    /// Lays out the receiver's children.
    ///
    /// `changed` discards cached layout data; `all` cascades down the whole
    /// subtree. While layout is deferred, this only marks state.
    fn layout_with(&self, changed: bool, all: bool) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        let has_layout = handle
            .display
            .core()
            .with_widget(handle.id, |data| Ok(data.layout.is_some()))?;
        if !has_layout && !all {
            return Ok(());
        }
        handle.display.core().mark_layout(handle.id, changed, all)?;
        handle.display.core().update_layout(handle.id, all)
    }

    /// Lays out the ancestor paths of `changed` up to (and including) the
    /// receiver, marking only those paths dirty.
    fn layout_controls(&self, changed: &[&dyn Control], flags: LayoutFlags) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        let ids: Vec<WidgetId> = changed.iter().map(|control| control.id()).collect();
        handle.display.core().layout_controls(handle.id, &ids, flags)
    }

    /// Runs a whole-subtree pass described by `flags` (ALL/CHANGED/DEFER).
    fn layout_flags(&self, flags: LayoutFlags) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        let has_layout = handle
            .display
            .core()
            .with_widget(handle.id, |data| Ok(data.layout.is_some()))?;
        if !has_layout && !flags.contains(LayoutFlags::ALL) {
            return Ok(());
        }
        handle.display.core().mark_layout(
            handle.id,
            flags.contains(LayoutFlags::CHANGED),
            flags.contains(LayoutFlags::ALL),
        )?;
        if flags.contains(LayoutFlags::DEFER) {
            handle.display.core().set_layout_deferred(handle.id, true)?;
            handle.display.core().add_layout_deferred(handle.id);
        }
        handle
            .display
            .core()
            .update_layout(handle.id, flags.contains(LayoutFlags::ALL))
    }

    /// Nested deferral: layout resumes when as many `false` calls as `true`
    /// calls have been made, and then flushes once.
    fn set_layout_deferred(&self, defer: bool) -> Result<()> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle.display.core().set_layout_deferred(handle.id, defer)
    }

    /// Whether the receiver itself has deferred layout.
    fn layout_deferred(&self) -> Result<bool> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        handle
            .display
            .core()
            .with_widget(handle.id, |data| Ok(data.layout_count > 0))
    }

    /// Whether the receiver or any ancestor has deferred layout.
    fn is_layout_deferred(&self) -> Result<bool> {
        let handle = self.handle();
        handle.display.core().check_widget(handle.id)?;
        Ok(handle
            .display
            .core()
            .find_deferred_control(handle.id)?
            .is_some())
    }

    /// The area available to children, in the receiver's coordinates.
    fn client_area(&self) -> Result<Rect> {
        Ok(self.bounds()?.at_origin())
    }

    /// A type-erased reference to this container.
    fn as_container_ref(&self) -> ContainerRef {
        ContainerRef {
            handle: self.handle().clone(),
        }
    }
}

// --- MARK: TYPE-ERASED HANDLES

/// A reference to any widget.
#[derive(Clone)]
pub struct WidgetRef {
    pub(crate) handle: WidgetHandle,
}

impl fmt::Debug for WidgetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRef")
            .field("id", &self.handle.id)
            .finish()
    }
}

impl PartialEq for WidgetRef {
    fn eq(&self, other: &Self) -> bool {
        self.handle.id == other.handle.id
    }
}

impl sealed::HasHandle for WidgetRef {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for WidgetRef {}

/// A reference to any control.
#[derive(Clone)]
pub struct ControlRef {
    pub(crate) handle: WidgetHandle,
}

impl fmt::Debug for ControlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlRef")
            .field("id", &self.handle.id)
            .finish()
    }
}

impl sealed::HasHandle for ControlRef {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for ControlRef {}
impl Control for ControlRef {}

/// A reference to any container.
#[derive(Clone)]
pub struct ContainerRef {
    pub(crate) handle: WidgetHandle,
}

impl fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerRef")
            .field("id", &self.handle.id)
            .finish()
    }
}

impl sealed::HasHandle for ContainerRef {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for ContainerRef {}
impl Control for ContainerRef {}
impl Container for ContainerRef {}
