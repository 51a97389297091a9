// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Error, Result, Style};
use crate::remote::config::FixedTextModelConfig;
use crate::remote::{RemoteControl, RemoteLabel};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{control_name, Container, Control, Widget};

/// A non-editable piece of text, backed by a fixed-text peer.
pub struct Label {
    handle: WidgetHandle,
}

impl Label {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;

        let config = FixedTextModelConfig::new(control_name("label"));
        let wrapper = RemoteLabel::new(display.session(), &parent_peer, config)?;

        let data = WidgetData::new(WidgetKind::Label, RemoteHandle::Label(wrapper), style);
        let id = display.core().register_widget(data, Some(parent.id()))?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &data.remote {
            RemoteHandle::Label(wrapper) => wrapper.set_text(text),
            _ => Err(Error::NoHandles("not a label peer")),
        })
    }

    pub fn text(&self) -> Result<String> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &data.remote {
            RemoteHandle::Label(wrapper) => wrapper.text(),
            _ => Err(Error::NoHandles("not a label peer")),
        })
    }

    /// LEFT, CENTER or RIGHT, from the construction style.
    pub fn alignment(&self) -> Result<Style> {
        let style = self.style()?;
        Ok(style & (Style::LEFT | Style::CENTER | Style::RIGHT))
    }
}

impl sealed::HasHandle for Label {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for Label {}
impl Control for Label {}
