// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Error, Result, Style};
use crate::remote::config::EditModelConfig;
use crate::remote::value::FontDescriptor;
use crate::remote::{RemoteControl, RemoteText};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{control_name, Container, Control, Widget};

/// An editable text field, backed by an edit peer.
pub struct Text {
    handle: WidgetHandle,
}

impl Text {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;

        let config = EditModelConfig::new(control_name("text"));
        let wrapper = RemoteText::new(display.session(), &parent_peer, config)?;

        let data = WidgetData::new(WidgetKind::Text, RemoteHandle::Text(wrapper), style);
        let id = display.core().register_widget(data, Some(parent.id()))?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }

    fn with_wrapper<R>(&self, f: impl FnOnce(&RemoteText) -> Result<R>) -> Result<R> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &data.remote {
            RemoteHandle::Text(wrapper) => f(wrapper),
            _ => Err(Error::NoHandles("not a text peer")),
        })
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        self.with_wrapper(|wrapper| wrapper.set_text(text))
    }

    pub fn text(&self) -> Result<String> {
        self.with_wrapper(|wrapper| wrapper.text())
    }

    pub fn append(&self, text: &str) -> Result<()> {
        self.with_wrapper(|wrapper| {
            let mut current = wrapper.text()?;
            current.push_str(text);
            wrapper.set_text(&current)
        })
    }

    pub fn set_font(&self, font: FontDescriptor) -> Result<()> {
        self.with_wrapper(|wrapper| wrapper.set_font(font))
    }

    pub fn font(&self) -> Result<FontDescriptor> {
        self.with_wrapper(|wrapper| wrapper.font())
    }
}

impl sealed::HasHandle for Text {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for Text {}
impl Control for Text {}
