// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::app::{Display, TopWindowGlue, WindowGlue};
use crate::core::{Event, EventType, Rect, Result, Style};
use crate::remote::api::RemoteInstance;
use crate::remote::{RemoteControl, RemoteWindow};
use crate::widgets::widget::{
    sealed, RemoteHandle, WidgetData, WidgetFlags, WidgetHandle, WidgetKind,
};
use crate::widgets::{Container, Control, Widget};

/// A top-level window, managed by the remote desktop.
///
/// Shells are the roots of the widget tree: they have no parent and their
/// remote peer is created directly by the toolkit service rather than
/// relative to another peer. A shell starts hidden; [`open`](Self::open)
/// makes it visible.
///
/// The window-manager close action arrives as a Close event; unless a
/// listener vetoes it (`doit = false`), the shell is disposed.
pub struct Shell {
    handle: WidgetHandle,
}

/// Where new shells appear when the application does not position them.
const DEFAULT_SHELL_BOUNDS: Rect = Rect::new(100, 100, 800, 800);

impl Shell {
    pub fn new(display: &Display) -> Result<Self> {
        Self::new_with_style(display, Style::SHELL_TRIM)
    }

    pub fn new_with_style(display: &Display, style: Style) -> Result<Self> {
        display.core().check_device()?;
        let window = RemoteWindow::new_top_level(display.session(), DEFAULT_SHELL_BOUNDS)?;

        let peer = window.peer_object()?.peer_id();
        let dispatcher = display.core().dispatcher();
        window.add_window_listener(Arc::new(WindowGlue {
            dispatcher: dispatcher.clone(),
            peer,
        }))?;
        window.add_top_window_listener(Arc::new(TopWindowGlue { dispatcher, peer }))?;

        let data = WidgetData::new(WidgetKind::Shell, RemoteHandle::Window(window), style);
        let id = display.core().register_widget(data, None)?;
        Ok(Self {
            handle: WidgetHandle {
                display: display.clone(),
                id,
            },
        })
    }

    pub(crate) fn from_handle(handle: WidgetHandle) -> Self {
        Self { handle }
    }

    /// Makes the shell visible and schedules its Activate event.
    pub fn open(&self) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| {
            data.flags.insert(WidgetFlags::OPENED);
            Ok(())
        })?;
        self.set_visible(true)?;
        let mut event = Event::new(EventType::Activate);
        event.widget = Some(self.as_widget());
        core.post_event(event);
        Ok(())
    }

    /// Whether [`open`](Self::open) has been called.
    pub fn is_open(&self) -> Result<bool> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| {
            Ok(data.flags.contains(WidgetFlags::OPENED))
        })
    }

    /// Requests that the shell close, exactly as the window manager would.
    /// Listeners may veto by clearing `doit`.
    pub fn close(&self) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        let mut event = Event::new(EventType::Close);
        self.notify_listeners(EventType::Close, &mut event)?;
        if event.doit {
            self.dispose()?;
        }
        Ok(())
    }

    /// Sets the shell title.
    ///
    /// The title is a local attribute: the backend's plain window peer has
    /// no title interface.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| {
            data.text = text.to_owned();
            Ok(())
        })
    }

    pub fn text(&self) -> Result<String> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| Ok(data.text.clone()))
    }
}

impl sealed::HasHandle for Shell {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for Shell {}
impl Control for Shell {}
impl Container for Shell {}
