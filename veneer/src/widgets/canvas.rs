// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::app::{MouseGlue, PaintGlue};
use crate::core::{Error, Rect, Result, Style};
use crate::remote::api::RemoteInstance;
use crate::remote::{Graphics, RemoteCanvas, RemoteControl};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{Container, Control, Widget};

/// A drawable container.
///
/// Remote paint callbacks surface as Paint events carrying the update
/// rectangle; application code draws through [`graphics`](Self::graphics).
pub struct Canvas {
    handle: WidgetHandle,
}

const DEFAULT_CANVAS_BOUNDS: Rect = Rect::new(0, 0, 400, 400);

impl Canvas {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;
        let wrapper = RemoteCanvas::new(display.session(), &parent_peer, DEFAULT_CANVAS_BOUNDS)?;

        let peer = wrapper.peer_object()?.peer_id();
        let dispatcher = display.core().dispatcher();
        wrapper.window().add_paint_listener(Arc::new(PaintGlue {
            dispatcher: dispatcher.clone(),
            peer,
        }))?;
        wrapper
            .window()
            .add_mouse_listener(Arc::new(MouseGlue { dispatcher, peer }))?;

        let data = WidgetData::new(WidgetKind::Canvas, RemoteHandle::Canvas(wrapper), style);
        let id = display.core().register_widget(data, Some(parent.id()))?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }

    /// The canvas's graphics context, created on first use.
    pub fn graphics(&self) -> Result<Graphics> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &mut data.remote {
            RemoteHandle::Canvas(wrapper) => wrapper.graphics(),
            _ => Err(Error::NoHandles("not a canvas peer")),
        })
    }
}

impl sealed::HasHandle for Canvas {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for Canvas {}
impl Control for Canvas {}
impl Container for Canvas {}
