// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Error, Result};
use crate::remote::api::{
    self, RemoteObject, SERVICE_PROGRESS_BAR, SERVICE_PROGRESS_BAR_MODEL,
};
use crate::remote::config::ProgressBarModelConfig;
use crate::remote::control::{RemoteControl, RemoteControlCore};
use crate::remote::session::RemoteSession;

/// Wrapper for a remote progress-bar control.
///
/// The range endpoints are mirrored locally; the remote interface can only
/// be asked for the current value.
pub struct RemoteProgressBar {
    core: RemoteControlCore,
    min: i32,
    max: i32,
}

impl RemoteProgressBar {
    pub fn new(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        config: ProgressBarModelConfig,
    ) -> Result<Self> {
        let bounds = config.bounds;
        let core = RemoteControlCore::create(
            session,
            parent_peer,
            SERVICE_PROGRESS_BAR_MODEL,
            SERVICE_PROGRESS_BAR,
            |bag| config.apply(bag),
            bounds,
        )?;
        Ok(Self {
            core,
            min: 0,
            max: 100,
        })
    }

    pub(crate) fn model_object(&self) -> &RemoteObject {
        self.core.model_object()
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn set_range(&mut self, min: i32, max: i32) -> Result<()> {
        if self.core.is_disposed() {
            return Err(Error::WidgetDisposed);
        }
        api::progress_bar(self.core.control_object())?.set_range(min, max)?;
        self.min = min;
        self.max = max;
        Ok(())
    }

    pub fn set_value(&self, value: i32) -> Result<()> {
        if self.core.is_disposed() {
            return Err(Error::WidgetDisposed);
        }
        api::progress_bar(self.core.control_object())?.set_value(value)?;
        Ok(())
    }

    pub fn value(&self) -> Result<i32> {
        if self.core.is_disposed() {
            return Err(Error::WidgetDisposed);
        }
        Ok(api::progress_bar(self.core.control_object())?.value()?)
    }
}

impl RemoteControl for RemoteProgressBar {
    fn window_object(&self) -> Result<RemoteObject> {
        self.core.window_object()
    }

    fn parent_peer(&self) -> Option<&RemoteObject> {
        self.core.parent_peer()
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    fn mark_disposed(&mut self) {
        self.core.mark_disposed();
    }
}
