// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The display: one cooperative event loop per thread.
//!
//! The thread that constructs a [`Display`] becomes its user-interface
//! thread. The event loop for that display must run on that thread, and
//! nearly every widget operation may only be called from it; other threads
//! communicate through [`Display::async_exec`] and [`Display::sync_exec`].
//!
//! A tick of [`Display::read_and_dispatch`] runs, in order: the skin pass,
//! deferred layouts, due timers, queued toolkit events, and finally (when
//! nothing else produced work) one cross-thread runnable.
//!
//! The display also owns the widget tree and the identity map from remote
//! peers to widgets, which is how callbacks arriving from the automation
//! service find their way back into the toolkit.

use std::cell::Cell;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::app::synchronizer::Synchronizer;
use crate::core::{Error, Event, EventTable, EventType, Listener, Rect, Result};
use crate::remote::api::{self, MouseEventData, PeerId, RemoteInstance};
use crate::remote::RemoteSession;
use crate::widgets::widget::{WidgetData, WidgetFlags, WidgetHandle, WidgetKind};
use crate::widgets::{ContainerRef, ControlRef, Shell, WidgetId, WidgetRef};

thread_local! {
    /// At most one display per thread.
    static DISPLAY_ON_THREAD: Cell<bool> = const { Cell::new(false) };
}

// --- MARK: OPTIONS

/// Options for creating a [`Display`].
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    /// Route every remote callback through [`Display::async_exec`] before
    /// toolkit listeners run, so listeners always execute on the display
    /// thread.
    ///
    /// Turning this off restores the raw behavior where listeners run on
    /// whatever thread the automation service delivers its callbacks on,
    /// which violates the toolkit's thread-affinity contract.
    pub marshal_remote_callbacks: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            marshal_remote_callbacks: true,
        }
    }
}

// --- MARK: DISPLAY

/// The connection between the widget toolkit and the remote backend.
///
/// Cheap to clone; all clones refer to the same display.
#[derive(Clone)]
pub struct Display {
    core: Arc<DisplayCore>,
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("thread", &self.core.thread)
            .field("disposed", &self.core.disposed.load(Ordering::SeqCst))
            .finish()
    }
}

impl Display {
    /// Creates a display owned by the calling thread.
    pub fn new(session: RemoteSession) -> Result<Self> {
        Self::new_with_options(session, DisplayOptions::default())
    }

    pub fn new_with_options(session: RemoteSession, options: DisplayOptions) -> Result<Self> {
        DISPLAY_ON_THREAD.with(|slot| {
            if slot.get() {
                return Err(Error::ThreadInvalidAccess);
            }
            slot.set(true);
            Ok(())
        })?;
        let core = Arc::new_cyclic(|weak| DisplayCore {
            self_weak: weak.clone(),
            thread: thread::current().id(),
            session,
            options,
            created_at: Instant::now(),
            disposed: AtomicBool::new(false),
            synchronizer: Synchronizer::new(),
            timer_seq: AtomicU64::new(0),
            state: Mutex::new(DisplayState::default()),
        });
        Ok(Self { core })
    }

    pub(crate) fn core(&self) -> &DisplayCore {
        &self.core
    }

    pub fn session(&self) -> &RemoteSession {
        &self.core.session
    }

    /// The display's user-interface thread.
    pub fn thread(&self) -> ThreadId {
        self.core.thread
    }

    pub fn is_disposed(&self) -> bool {
        self.core.disposed.load(Ordering::SeqCst)
    }

    /// Processes one tick of pending work.
    ///
    /// Returns `true` if there is potentially more work to do, `false` if the
    /// caller can [`sleep`](Self::sleep).
    pub fn read_and_dispatch(&self) -> Result<bool> {
        self.core.check_device()?;
        self.core.run_skin();
        self.core.run_deferred_layouts()?;
        let mut events = false;
        events |= self.core.run_timers();
        events |= self.core.run_deferred_events();
        if !events {
            events = self.is_disposed() || self.core.synchronizer.run_async_messages(false);
        }
        Ok(events)
    }

    /// Blocks the user-interface thread until work is available or
    /// [`wake`](Self::wake) is called.
    pub fn sleep(&self) -> Result<bool> {
        self.core.check_device()?;
        if !self.core.synchronizer.is_empty() {
            return Ok(true);
        }
        let timeout = {
            let state = self.core.state.lock().unwrap();
            if !state.event_queue.is_empty() {
                return Ok(true);
            }
            match state.timers.peek() {
                Some(timer) => {
                    let now = Instant::now();
                    if timer.deadline <= now {
                        return Ok(true);
                    }
                    Some(timer.deadline - now)
                }
                None => None,
            }
        };
        self.core.synchronizer.wait(timeout);
        Ok(true)
    }

    /// Wakes the user-interface thread if it is sleeping. May be called from
    /// any thread.
    pub fn wake(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::DeviceDisposed);
        }
        if thread::current().id() == self.core.thread {
            return Ok(());
        }
        self.core.synchronizer.wake();
        Ok(())
    }

    /// Runs `runnable` on the user-interface thread at the next reasonable
    /// opportunity; the caller continues in parallel. FIFO per enqueueing
    /// thread. May be called from any thread.
    pub fn async_exec(&self, runnable: impl FnOnce() + Send + 'static) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::DeviceDisposed);
        }
        self.core.synchronizer.async_exec(Box::new(runnable));
        Ok(())
    }

    /// Runs `runnable` on the user-interface thread and blocks the calling
    /// thread until it has completed, propagating any panic it raises.
    ///
    /// There is no timeout: a wedged user-interface thread blocks the caller
    /// indefinitely. When called from the user-interface thread itself the
    /// runnable executes immediately.
    pub fn sync_exec(&self, runnable: impl FnOnce() + Send + 'static) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::DeviceDisposed);
        }
        if thread::current().id() == self.core.thread {
            runnable();
            return Ok(());
        }
        self.core.synchronizer.sync_exec(Box::new(runnable));
        Ok(())
    }

    /// Guarantees execution on the user-interface thread: immediate when
    /// called from it, [`async_exec`](Self::async_exec) otherwise.
    pub fn execute(&self, runnable: impl FnOnce() + Send + 'static) -> Result<()> {
        if thread::current().id() == self.core.thread {
            self.sync_exec(runnable)
        } else {
            self.async_exec(runnable)
        }
    }

    /// Runs `runnable` on the user-interface thread after `delay`.
    pub fn timer_exec(&self, delay: Duration, runnable: impl FnOnce() + Send + 'static) -> Result<()> {
        self.core.check_device()?;
        let entry = TimerEntry {
            deadline: Instant::now() + delay,
            seq: self.core.timer_seq.fetch_add(1, Ordering::Relaxed),
            task: Box::new(runnable),
        };
        self.core.state.lock().unwrap().timers.push(entry);
        Ok(())
    }

    /// Adds a display-level listener, notified when an event of the given
    /// type occurs on the display itself (Skin, Settings, Dispose).
    pub fn add_listener(&self, event_type: EventType, listener: Listener) -> Result<()> {
        self.core.check_device()?;
        self.core
            .state
            .lock()
            .unwrap()
            .event_table
            .hook(event_type, listener);
        Ok(())
    }

    pub fn remove_listener(&self, event_type: EventType, listener: &Listener) -> Result<()> {
        self.core.check_device()?;
        self.core
            .state
            .lock()
            .unwrap()
            .event_table
            .unhook(event_type, listener);
        Ok(())
    }

    /// Adds a filter, notified before the listeners of *any* widget when an
    /// event of the given type occurs anywhere on this display.
    pub fn add_filter(&self, event_type: EventType, listener: Listener) -> Result<()> {
        self.core.check_device()?;
        self.core
            .state
            .lock()
            .unwrap()
            .filter_table
            .hook(event_type, listener);
        Ok(())
    }

    pub fn remove_filter(&self, event_type: EventType, listener: &Listener) -> Result<()> {
        self.core.check_device()?;
        self.core
            .state
            .lock()
            .unwrap()
            .filter_table
            .unhook(event_type, listener);
        Ok(())
    }

    /// The live top-level shells of this display, in creation order.
    pub fn shells(&self) -> Result<Vec<Shell>> {
        self.core.check_device()?;
        let ids: Vec<WidgetId> = self.core.state.lock().unwrap().shells.clone();
        Ok(ids
            .into_iter()
            .map(|id| {
                Shell::from_handle(WidgetHandle {
                    display: self.clone(),
                    id,
                })
            })
            .collect())
    }

    /// Disposes the display: every shell is disposed, remaining cross-thread
    /// runnables are drained, and the per-thread display slot is freed.
    pub fn dispose(&self) -> Result<()> {
        self.core.check_device()?;
        let shells: Vec<WidgetId> = self.core.state.lock().unwrap().shells.clone();
        for shell in shells {
            self.core.dispose_widget(shell)?;
        }
        let mut event = Event::new(EventType::Dispose);
        self.core.send_display_event(&mut event);
        self.core.synchronizer.run_async_messages(true);
        self.core.disposed.store(true, Ordering::SeqCst);
        DISPLAY_ON_THREAD.with(|slot| slot.set(false));
        Ok(())
    }
}

// --- MARK: CORE STATE

#[derive(Default)]
pub(crate) struct DisplayState {
    pub(crate) widgets: HashMap<WidgetId, WidgetData>,
    /// Remote peer identity to owning widget. Installed at most once per
    /// peer, removed exactly once at disposal.
    pub(crate) widget_map: HashMap<PeerId, WidgetId>,
    pub(crate) shells: Vec<WidgetId>,
    pub(crate) skin_list: Vec<WidgetId>,
    pub(crate) layout_deferred: Vec<WidgetId>,
    pub(crate) event_queue: VecDeque<Event>,
    pub(crate) timers: BinaryHeap<TimerEntry>,
    pub(crate) event_table: EventTable,
    pub(crate) filter_table: EventTable,
}

pub(crate) struct DisplayCore {
    self_weak: Weak<DisplayCore>,
    pub(crate) thread: ThreadId,
    pub(crate) session: RemoteSession,
    pub(crate) options: DisplayOptions,
    created_at: Instant,
    disposed: AtomicBool,
    pub(crate) synchronizer: Synchronizer,
    timer_seq: AtomicU64,
    pub(crate) state: Mutex<DisplayState>,
}

impl DisplayCore {
    fn display(&self) -> Display {
        Display {
            // The weak self-reference is set at construction and lives as
            // long as any handle.
            core: self.self_weak.upgrade().expect("display core gone"),
        }
    }

    pub(crate) fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            core: self.self_weak.clone(),
        }
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.created_at.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    // --- MARK: CHECKS

    pub(crate) fn check_thread(&self) -> Result<()> {
        if thread::current().id() != self.thread {
            return Err(Error::ThreadInvalidAccess);
        }
        Ok(())
    }

    pub(crate) fn check_device(&self) -> Result<()> {
        self.check_thread()?;
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::DeviceDisposed);
        }
        Ok(())
    }

    /// The safety gate in front of every widget operation: right thread,
    /// widget alive.
    pub(crate) fn check_widget(&self, id: WidgetId) -> Result<()> {
        self.check_thread()?;
        if !self.widget_exists(id) {
            return Err(Error::WidgetDisposed);
        }
        Ok(())
    }

    pub(crate) fn widget_exists(&self, id: WidgetId) -> bool {
        if self.disposed.load(Ordering::SeqCst) {
            return false;
        }
        self.state.lock().unwrap().widgets.contains_key(&id)
    }

    pub(crate) fn with_widget<R>(
        &self,
        id: WidgetId,
        f: impl FnOnce(&mut WidgetData) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.state.lock().unwrap();
        let data = state.widgets.get_mut(&id).ok_or(Error::WidgetDisposed)?;
        f(data)
    }

    // --- MARK: REGISTRATION

    /// Installs a freshly constructed widget: tree link, identity mapping,
    /// skin-pass registration.
    pub(crate) fn register_widget(
        &self,
        mut data: WidgetData,
        parent: Option<WidgetId>,
    ) -> Result<WidgetId> {
        let id = WidgetId::next();
        let peer = data
            .remote
            .as_control()
            .and_then(|control| control.peer_object().ok())
            .map(|object| object.peer_id());
        let mut state = self.state.lock().unwrap();
        data.parent = parent;
        if let Some(parent_id) = parent {
            state
                .widgets
                .get_mut(&parent_id)
                .ok_or(Error::WidgetDisposed)?
                .children
                .push(id);
        }
        if data.kind == WidgetKind::Shell {
            state.shells.push(id);
        }
        state.widgets.insert(id, data);
        if let Some(peer) = peer {
            // Installed at most once per peer; later inserts are ignored.
            state.widget_map.entry(peer).or_insert(id);
        }
        state.skin_list.push(id);
        Ok(id)
    }

    pub(crate) fn widget_for_peer(&self, peer: PeerId) -> Option<WidgetId> {
        self.state.lock().unwrap().widget_map.get(&peer).copied()
    }

    /// Snapshot of a container's child controls (tab items excluded).
    pub(crate) fn child_controls(&self, id: WidgetId) -> Result<Vec<WidgetId>> {
        let state = self.state.lock().unwrap();
        let data = state.widgets.get(&id).ok_or(Error::WidgetDisposed)?;
        Ok(data
            .children
            .iter()
            .copied()
            .filter(|child| {
                state
                    .widgets
                    .get(child)
                    .is_some_and(|child_data| child_data.kind != WidgetKind::TabItem)
            })
            .collect())
    }

    pub(crate) fn shell_of(&self, id: WidgetId) -> Result<WidgetId> {
        let state = self.state.lock().unwrap();
        let mut current = id;
        loop {
            let data = state.widgets.get(&current).ok_or(Error::WidgetDisposed)?;
            if data.kind == WidgetKind::Shell {
                return Ok(current);
            }
            current = data.parent.ok_or(Error::InvalidParent)?;
        }
    }

    // --- MARK: DISPOSAL

    /// Depth-first disposal: children first, then the Dispose event, then
    /// the remote peer, then the identity mapping.
    pub(crate) fn dispose_widget(&self, id: WidgetId) -> Result<()> {
        let Some(children) = ({
            let state = self.state.lock().unwrap();
            state.widgets.get(&id).map(|data| data.children.clone())
        }) else {
            return Ok(());
        };
        for child in children {
            self.dispose_widget(child)?;
        }

        let send_dispose = {
            let mut state = self.state.lock().unwrap();
            match state.widgets.get_mut(&id) {
                Some(data) if !data.flags.contains(WidgetFlags::DISPOSE_SENT) => {
                    data.flags.insert(WidgetFlags::DISPOSE_SENT);
                    true
                }
                _ => false,
            }
        };
        if send_dispose {
            let mut event = Event::new(EventType::Dispose);
            self.send_widget_event(id, &mut event);
        }

        // Release the remote peer outside the lock; callbacks fired by the
        // backend during disposal must not find the display locked.
        let window = {
            let state = self.state.lock().unwrap();
            state.widgets.get(&id).and_then(|data| {
                let control = data.remote.as_control()?;
                if control.is_disposed() {
                    None
                } else {
                    control.window_object().ok()
                }
            })
        };
        let peer = window.as_ref().map(|object| object.peer_id());
        if let Some(window) = window {
            if let Ok(window_api) = api::window(&window) {
                if let Err(error) = window_api.dispose() {
                    warn!(widget = %id, %error, "failed to dispose remote peer");
                }
            }
        }

        let mut state = self.state.lock().unwrap();
        if let Some(data) = state.widgets.get_mut(&id) {
            if let Some(control) = data.remote.as_control_mut() {
                control.mark_disposed();
            }
        }
        if let Some(peer) = peer {
            state.widget_map.remove(&peer);
        }
        let parent = state.widgets.get(&id).and_then(|data| data.parent);
        if let Some(parent_id) = parent {
            if let Some(parent_data) = state.widgets.get_mut(&parent_id) {
                parent_data.children.retain(|child| *child != id);
            }
        }
        state.shells.retain(|shell| *shell != id);
        state.widgets.remove(&id);
        Ok(())
    }

    // --- MARK: EVENT DISPATCH

    /// Sends an event to a widget's listeners, after the display's filters.
    /// Listeners run without any toolkit lock held.
    pub(crate) fn send_widget_event(&self, id: WidgetId, event: &mut Event) {
        event.widget = Some(WidgetRef {
            handle: WidgetHandle {
                display: self.display(),
                id,
            },
        });
        if event.time == 0 {
            event.time = self.elapsed_ms();
        }
        let (filters, listeners) = {
            let state = self.state.lock().unwrap();
            let filters = state.filter_table.listeners_for(event.event_type);
            let listeners = state
                .widgets
                .get(&id)
                .map(|data| data.listeners.listeners_for(event.event_type))
                .unwrap_or_default();
            (filters, listeners)
        };
        for filter in &filters {
            filter(event);
        }
        for listener in &listeners {
            listener(event);
        }
    }

    pub(crate) fn send_display_event(&self, event: &mut Event) {
        if event.time == 0 {
            event.time = self.elapsed_ms();
        }
        let (filters, listeners) = {
            let state = self.state.lock().unwrap();
            (
                state.filter_table.listeners_for(event.event_type),
                state.event_table.listeners_for(event.event_type),
            )
        };
        for filter in &filters {
            filter(event);
        }
        for listener in &listeners {
            listener(event);
        }
    }

    /// Appends an event for the deferred-event stage of the next tick.
    pub(crate) fn post_event(&self, event: Event) {
        self.state.lock().unwrap().event_queue.push_back(event);
    }

    // --- MARK: TICK STAGES

    /// Sends the Skin event for widgets flagged since the last tick.
    pub(crate) fn run_skin(&self) -> bool {
        let (pending, hooked) = {
            let mut state = self.state.lock().unwrap();
            if state.skin_list.is_empty() {
                return false;
            }
            let pending = std::mem::take(&mut state.skin_list);
            let hooked = state.event_table.hooks(EventType::Skin);
            (pending, hooked)
        };
        if hooked {
            for id in pending {
                let cleared = self
                    .with_widget(id, |data| {
                        data.flags.remove(WidgetFlags::SKIN_NEEDED);
                        Ok(())
                    })
                    .is_ok();
                if cleared {
                    let mut event = Event::new(EventType::Skin);
                    event.widget = Some(WidgetRef {
                        handle: WidgetHandle {
                            display: self.display(),
                            id,
                        },
                    });
                    self.send_display_event(&mut event);
                }
            }
        }
        true
    }

    /// Ends the deferred scopes scheduled via DEFER layout flags.
    pub(crate) fn run_deferred_layouts(&self) -> Result<bool> {
        let pending = {
            let mut state = self.state.lock().unwrap();
            if state.layout_deferred.is_empty() {
                return Ok(false);
            }
            std::mem::take(&mut state.layout_deferred)
        };
        for id in pending {
            if self.widget_exists(id) {
                self.set_layout_deferred(id, false)?;
            }
        }
        Ok(true)
    }

    pub(crate) fn run_timers(&self) -> bool {
        let now = Instant::now();
        let mut due = Vec::new();
        {
            let mut state = self.state.lock().unwrap();
            while state
                .timers
                .peek()
                .is_some_and(|timer| timer.deadline <= now)
            {
                due.push(state.timers.pop().unwrap());
            }
        }
        let ran = !due.is_empty();
        for timer in due {
            (timer.task)();
        }
        ran
    }

    pub(crate) fn run_deferred_events(&self) -> bool {
        let mut ran = false;
        loop {
            let event = self.state.lock().unwrap().event_queue.pop_front();
            let Some(mut event) = event else {
                break;
            };
            match event.widget.clone() {
                Some(widget) if self.widget_exists(widget.handle.id) => {
                    ran = true;
                    self.send_widget_event(widget.handle.id, &mut event);
                }
                Some(_) => {}
                None => {
                    ran = true;
                    self.send_display_event(&mut event);
                }
            }
        }
        ran
    }

    // --- MARK: LAYOUT PROTOCOL

    pub(crate) fn mark_layout(&self, id: WidgetId, changed: bool, all: bool) -> Result<()> {
        self.with_widget(id, |data| {
            if data.layout.is_some() {
                data.flags.insert(WidgetFlags::LAYOUT_NEEDED);
                if changed {
                    data.flags.insert(WidgetFlags::LAYOUT_CHANGED);
                }
            }
            Ok(())
        })?;
        if all {
            for child in self.child_controls(id)? {
                self.mark_layout(child, changed, all)?;
            }
        }
        Ok(())
    }

    /// The composite whose deferred scope covers `id`, if any.
    pub(crate) fn find_deferred_control(&self, id: WidgetId) -> Result<Option<WidgetId>> {
        let state = self.state.lock().unwrap();
        let mut current = Some(id);
        while let Some(cursor) = current {
            let Some(data) = state.widgets.get(&cursor) else {
                break;
            };
            if data.layout_count > 0 {
                return Ok(Some(cursor));
            }
            current = data.parent;
        }
        Ok(None)
    }

    /// Runs the layout of `id` if it is marked, then cascades when `all`.
    ///
    /// Inside a deferred scope this only records that a descendant wants
    /// layout; the scope's end flushes once.
    pub(crate) fn update_layout(&self, id: WidgetId, all: bool) -> Result<()> {
        if let Some(deferred) = self.find_deferred_control(id)? {
            self.with_widget(deferred, |data| {
                data.flags.insert(WidgetFlags::LAYOUT_CHILD);
                Ok(())
            })?;
            return Ok(());
        }

        // The layout strategy is lifted out of the tree while it runs, so it
        // can call back into the toolkit freely.
        let run = self.with_widget(id, |data| {
            if data.flags.contains(WidgetFlags::LAYOUT_NEEDED) {
                let changed = data.flags.contains(WidgetFlags::LAYOUT_CHANGED);
                data.flags
                    .remove(WidgetFlags::LAYOUT_NEEDED | WidgetFlags::LAYOUT_CHANGED);
                Ok(data.layout.take().map(|layout| (layout, changed)))
            } else {
                Ok(None)
            }
        })?;
        if let Some((mut layout, changed)) = run {
            self.run_skin();
            let container = ContainerRef {
                handle: WidgetHandle {
                    display: self.display(),
                    id,
                },
            };
            let outcome = layout.layout(&container, changed);
            let _ = self.with_widget(id, |data| {
                if data.layout.is_none() {
                    data.layout = Some(layout);
                }
                Ok(())
            });
            outcome?;
        }

        if all {
            self.with_widget(id, |data| {
                data.flags.remove(WidgetFlags::LAYOUT_CHILD);
                Ok(())
            })?;
            for child in self.child_controls(id)? {
                self.update_layout(child, all)?;
            }
        }
        Ok(())
    }

    pub(crate) fn set_layout_deferred(&self, id: WidgetId, defer: bool) -> Result<()> {
        if defer {
            self.with_widget(id, |data| {
                data.layout_count += 1;
                Ok(())
            })
        } else {
            let flush = self.with_widget(id, |data| {
                if data.layout_count == 0 {
                    warn!(widget = %id, "unbalanced set_layout_deferred(false)");
                    return Ok(false);
                }
                data.layout_count -= 1;
                Ok(data.layout_count == 0
                    && data
                        .flags
                        .intersects(WidgetFlags::LAYOUT_CHILD | WidgetFlags::LAYOUT_NEEDED))
            })?;
            if flush {
                self.update_layout(id, true)?;
            }
            Ok(())
        }
    }

    pub(crate) fn add_layout_deferred(&self, id: WidgetId) {
        self.state.lock().unwrap().layout_deferred.push(id);
    }

    /// Scoped layout: marks the ancestor chain of each control in `changed`,
    /// up to (but not past) `receiver`, then updates bottom-up.
    pub(crate) fn layout_controls(
        &self,
        receiver: WidgetId,
        changed: &[WidgetId],
        flags: crate::core::LayoutFlags,
    ) -> Result<()> {
        use crate::core::LayoutFlags;

        // Validate first: live controls, all inside the receiver's tree.
        for &control in changed {
            if !self.widget_exists(control) {
                return Err(Error::InvalidArgument("changed control is disposed"));
            }
            let mut ancestor = false;
            let mut cursor = self.with_widget(control, |data| Ok(data.parent))?;
            while let Some(current) = cursor {
                if current == receiver {
                    ancestor = true;
                    break;
                }
                cursor = self.with_widget(current, |data| Ok(data.parent))?;
            }
            if !ancestor && control != receiver {
                return Err(Error::InvalidParent);
            }
        }

        let mut update: Vec<WidgetId> = Vec::new();
        for &element in changed {
            self.mark_layout(element, false, false)?;
            let mut child = element;
            while child != receiver {
                let composite = self
                    .with_widget(child, |data| Ok(data.parent))?
                    .ok_or(Error::InvalidParent)?;
                let child_ref = ControlRef {
                    handle: WidgetHandle {
                        display: self.display(),
                        id: child,
                    },
                };
                // Flush the cache outside the lock, like the layout pass.
                let layout = self.with_widget(composite, |data| {
                    if data.layout.is_some() {
                        data.flags.insert(WidgetFlags::LAYOUT_NEEDED);
                    }
                    Ok(data.layout.take())
                })?;
                if let Some(mut layout) = layout {
                    let kept = layout.flush_cache(&child_ref);
                    let _ = self.with_widget(composite, |data| {
                        if !kept {
                            data.flags.insert(WidgetFlags::LAYOUT_CHANGED);
                        }
                        if data.layout.is_none() {
                            data.layout = Some(layout);
                        }
                        Ok(())
                    });
                }
                update.push(composite);
                child = composite;
            }
        }

        if flags.contains(LayoutFlags::DEFER) {
            self.set_layout_deferred(receiver, true)?;
            self.add_layout_deferred(receiver);
        }
        for &composite in update.iter().rev() {
            self.update_layout(composite, false)?;
        }
        Ok(())
    }

    // --- MARK: REMOTE CALLBACK DELIVERY

    /// Translates one remote callback into a toolkit event and dispatches it
    /// to the owning widget. Runs on the display thread when callbacks are
    /// marshaled (the default).
    fn deliver(&self, peer: PeerId, kind: RemoteEventKind) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        let Some(id) = self.widget_for_peer(peer) else {
            return;
        };
        match kind {
            RemoteEventKind::Action => {
                let mut event = Event::new(EventType::Selection);
                // Assume the primary button triggered the action.
                event.button = 1;
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::MouseDown(data) => self.send_mouse(id, EventType::MouseDown, data),
            RemoteEventKind::MouseUp(data) => self.send_mouse(id, EventType::MouseUp, data),
            RemoteEventKind::MouseEnter(data) => self.send_mouse(id, EventType::MouseEnter, data),
            RemoteEventKind::MouseExit(data) => self.send_mouse(id, EventType::MouseExit, data),
            RemoteEventKind::Shown => {
                let mut event = Event::new(EventType::Show);
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Hidden => {
                let mut event = Event::new(EventType::Hide);
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Resized(bounds) => {
                let mut event = Event::new(EventType::Resize);
                event.width = bounds.width;
                event.height = bounds.height;
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Moved(bounds) => {
                let mut event = Event::new(EventType::Move);
                event.x = bounds.x;
                event.y = bounds.y;
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Paint(update_rect) => {
                let mut event = Event::new(EventType::Paint);
                event.x = update_rect.x;
                event.y = update_rect.y;
                event.width = update_rect.width;
                event.height = update_rect.height;
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Activated => {
                let mut event = Event::new(EventType::Activate);
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Deactivated => {
                let mut event = Event::new(EventType::Deactivate);
                self.send_widget_event(id, &mut event);
            }
            RemoteEventKind::Closing => {
                let mut event = Event::new(EventType::Close);
                self.send_widget_event(id, &mut event);
                if event.doit {
                    if let Err(error) = self.dispose_widget(id) {
                        warn!(widget = %id, %error, "failed to dispose widget on close");
                    }
                }
            }
            RemoteEventKind::Disposing => {
                // The peer is already gone remotely; mark the wrapper first
                // so disposal does not call back into it.
                let _ = self.with_widget(id, |data| {
                    if let Some(control) = data.remote.as_control_mut() {
                        control.mark_disposed();
                    }
                    Ok(())
                });
                if let Err(error) = self.dispose_widget(id) {
                    warn!(widget = %id, %error, "failed to dispose widget after remote disposal");
                }
            }
        }
    }

    fn send_mouse(&self, id: WidgetId, event_type: EventType, data: MouseEventData) {
        let mut event = Event::new(event_type);
        event.x = data.x;
        event.y = data.y;
        event.button = data.button;
        self.send_widget_event(id, &mut event);
    }
}

// --- MARK: TIMERS

/// A scheduled runnable. Ordered by deadline then insertion; both
/// comparisons are reversed because the standard heap is max-first.
pub(crate) struct TimerEntry {
    deadline: Instant,
    seq: u64,
    task: Box<dyn FnOnce() + Send>,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .reverse()
            .then(self.seq.cmp(&other.seq).reverse())
    }
}

// --- MARK: REMOTE GLUE

/// What a remote callback reported, normalized for dispatch.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RemoteEventKind {
    Action,
    MouseDown(MouseEventData),
    MouseUp(MouseEventData),
    MouseEnter(MouseEventData),
    MouseExit(MouseEventData),
    Shown,
    Hidden,
    Resized(Rect),
    Moved(Rect),
    Paint(Rect),
    Activated,
    Deactivated,
    Closing,
    Disposing,
}

/// Routes remote callbacks onto the display.
///
/// Holds the display weakly: a callback arriving after the display is gone
/// is dropped silently.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    core: Weak<DisplayCore>,
}

impl Dispatcher {
    pub(crate) fn dispatch(&self, peer: PeerId, kind: RemoteEventKind) {
        let Some(core) = self.core.upgrade() else {
            return;
        };
        if core.options.marshal_remote_callbacks {
            let weak = self.core.clone();
            core.synchronizer.async_exec(Box::new(move || {
                if let Some(core) = weak.upgrade() {
                    core.deliver(peer, kind);
                }
            }));
        } else {
            core.deliver(peer, kind);
        }
    }
}

/// Forwards window geometry/visibility callbacks for one peer.
pub(crate) struct WindowGlue {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) peer: PeerId,
}

impl api::WindowListener for WindowGlue {
    fn window_shown(&self) {
        self.dispatcher.dispatch(self.peer, RemoteEventKind::Shown);
    }

    fn window_hidden(&self) {
        self.dispatcher.dispatch(self.peer, RemoteEventKind::Hidden);
    }

    fn window_resized(&self, bounds: Rect) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::Resized(bounds));
    }

    fn window_moved(&self, bounds: Rect) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::Moved(bounds));
    }

    fn disposing(&self) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::Disposing);
    }
}

/// Forwards top-window lifecycle callbacks for one shell peer.
pub(crate) struct TopWindowGlue {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) peer: PeerId,
}

impl api::TopWindowListener for TopWindowGlue {
    fn window_closing(&self) {
        self.dispatcher.dispatch(self.peer, RemoteEventKind::Closing);
    }

    fn window_activated(&self) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::Activated);
    }

    fn window_deactivated(&self) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::Deactivated);
    }
}

/// Forwards mouse callbacks for one peer.
pub(crate) struct MouseGlue {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) peer: PeerId,
}

impl api::MouseListener for MouseGlue {
    fn mouse_pressed(&self, event: MouseEventData) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::MouseDown(event));
    }

    fn mouse_released(&self, event: MouseEventData) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::MouseUp(event));
    }

    fn mouse_entered(&self, event: MouseEventData) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::MouseEnter(event));
    }

    fn mouse_exited(&self, event: MouseEventData) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::MouseExit(event));
    }
}

/// Forwards button activations for one peer.
pub(crate) struct ActionGlue {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) peer: PeerId,
}

impl api::ActionListener for ActionGlue {
    fn action_performed(&self) {
        self.dispatcher.dispatch(self.peer, RemoteEventKind::Action);
    }
}

/// Forwards paint callbacks for one peer.
pub(crate) struct PaintGlue {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) peer: PeerId,
}

impl api::PaintListener for PaintGlue {
    fn window_paint(&self, update_rect: Rect) {
        self.dispatcher
            .dispatch(self.peer, RemoteEventKind::Paint(update_rect));
    }
}
