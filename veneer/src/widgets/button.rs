// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::app::{ActionGlue, MouseGlue};
use crate::core::{Error, Event, EventType, Listener, Result, Style};
use crate::remote::api::RemoteInstance;
use crate::remote::config::ButtonModelConfig;
use crate::remote::{RemoteButton, RemoteControl};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{control_name, Container, Control, Widget};

/// A push button.
///
/// Remote action events surface as Selection events on the display thread
/// (unless callback marshaling was turned off).
pub struct Button {
    handle: WidgetHandle,
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button").finish_non_exhaustive()
    }
}

impl Button {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;

        let config = ButtonModelConfig::new(control_name("button"));
        let wrapper = RemoteButton::new(display.session(), &parent_peer, config)?;

        let peer = wrapper.peer_object()?.peer_id();
        let dispatcher = display.core().dispatcher();
        wrapper.add_action_listener(Arc::new(ActionGlue {
            dispatcher: dispatcher.clone(),
            peer,
        }))?;
        wrapper.add_mouse_listener(Arc::new(MouseGlue { dispatcher, peer }))?;

        let data = WidgetData::new(WidgetKind::Button, RemoteHandle::Button(wrapper), style);
        let id = display.core().register_widget(data, Some(parent.id()))?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &data.remote {
            RemoteHandle::Button(wrapper) => wrapper.set_text(text),
            _ => Err(Error::NoHandles("not a button peer")),
        })
    }

    /// Reads the label back from the remote model.
    pub fn text(&self) -> Result<String> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &data.remote {
            RemoteHandle::Button(wrapper) => wrapper.text(),
            _ => Err(Error::NoHandles("not a button peer")),
        })
    }

    /// Registers `listener` for Selection events and returns the handle
    /// needed to remove it again.
    pub fn add_selection_listener(
        &self,
        listener: impl Fn(&mut Event) + Send + Sync + 'static,
    ) -> Result<Listener> {
        let listener: Listener = Arc::new(listener);
        self.add_listener(EventType::Selection, listener.clone())?;
        Ok(listener)
    }
}

impl sealed::HasHandle for Button {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for Button {}
impl Control for Button {}
