// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Error, Result, Style};
use crate::remote::config::ProgressBarModelConfig;
use crate::remote::{RemoteControl, RemoteProgressBar};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{control_name, Container, Control, Widget};

/// A progress indicator.
///
/// The selection is the remote peer's current value; the range endpoints are
/// mirrored locally because the remote interface cannot report them back.
pub struct ProgressBar {
    handle: WidgetHandle,
}

impl ProgressBar {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;

        let config = ProgressBarModelConfig::new(control_name("progress"));
        let wrapper = RemoteProgressBar::new(display.session(), &parent_peer, config)?;

        let data = WidgetData::new(
            WidgetKind::ProgressBar,
            RemoteHandle::Progress(wrapper),
            style,
        );
        let id = display.core().register_widget(data, Some(parent.id()))?;
        let bar = Self {
            handle: WidgetHandle { display, id },
        };
        bar.with_wrapper_mut(|wrapper| wrapper.set_range(0, 100))?;
        Ok(bar)
    }

    fn with_wrapper<R>(&self, f: impl FnOnce(&RemoteProgressBar) -> Result<R>) -> Result<R> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &data.remote {
            RemoteHandle::Progress(wrapper) => f(wrapper),
            _ => Err(Error::NoHandles("not a progress-bar peer")),
        })
    }

    fn with_wrapper_mut<R>(
        &self,
        f: impl FnOnce(&mut RemoteProgressBar) -> Result<R>,
    ) -> Result<R> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| match &mut data.remote {
            RemoteHandle::Progress(wrapper) => f(wrapper),
            _ => Err(Error::NoHandles("not a progress-bar peer")),
        })
    }

    pub fn minimum(&self) -> Result<i32> {
        self.with_wrapper(|wrapper| Ok(wrapper.min()))
    }

    /// Ignored unless `minimum < maximum` afterwards.
    pub fn set_minimum(&self, minimum: i32) -> Result<()> {
        self.with_wrapper_mut(|wrapper| {
            if minimum >= wrapper.max() {
                return Ok(());
            }
            wrapper.set_range(minimum, wrapper.max())
        })
    }

    pub fn maximum(&self) -> Result<i32> {
        self.with_wrapper(|wrapper| Ok(wrapper.max()))
    }

    /// Ignored unless `maximum > minimum` afterwards.
    pub fn set_maximum(&self, maximum: i32) -> Result<()> {
        self.with_wrapper_mut(|wrapper| {
            if maximum <= wrapper.min() {
                return Ok(());
            }
            wrapper.set_range(wrapper.min(), maximum)
        })
    }

    /// Reads the current value back from the remote peer.
    pub fn selection(&self) -> Result<i32> {
        self.with_wrapper(|wrapper| wrapper.value())
    }

    /// Clamped to the current range.
    pub fn set_selection(&self, value: i32) -> Result<()> {
        self.with_wrapper(|wrapper| {
            let clamped = value.clamp(wrapper.min(), wrapper.max());
            wrapper.set_value(clamped)
        })
    }
}

impl sealed::HasHandle for ProgressBar {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for ProgressBar {}
impl Control for ProgressBar {}
