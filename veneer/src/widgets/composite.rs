// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::app::WindowGlue;
use crate::core::{Rect, Result, Style};
use crate::remote::api::RemoteInstance;
use crate::remote::{RemoteControl, RemoteWindow};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{Container, Control, Widget};

/// A control that holds children and lays them out.
///
/// Backed by a container window peer, created relative to the parent's peer.
/// Constructing a composite before its parent's peer is realized fails with
/// a no-handles error; peers are strictly created parent-first.
pub struct Composite {
    handle: WidgetHandle,
}

const DEFAULT_COMPOSITE_BOUNDS: Rect = Rect::new(0, 0, 400, 400);

impl Composite {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;
        let window =
            RemoteWindow::new_container(display.session(), &parent_peer, DEFAULT_COMPOSITE_BOUNDS)?;

        let peer = window.peer_object()?.peer_id();
        let dispatcher = display.core().dispatcher();
        window.add_window_listener(Arc::new(WindowGlue { dispatcher, peer }))?;

        let data = WidgetData::new(WidgetKind::Composite, RemoteHandle::Window(window), style);
        let id = display.core().register_widget(data, Some(parent.id()))?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }
}

impl sealed::HasHandle for Composite {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for Composite {}
impl Control for Composite {}
impl Container for Composite {}
