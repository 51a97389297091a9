// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::Result;
use crate::remote::api::{
    self, RemoteObject, SERVICE_FIXED_TEXT, SERVICE_FIXED_TEXT_MODEL,
};
use crate::remote::config::FixedTextModelConfig;
use crate::remote::control::{RemoteControl, RemoteControlCore};
use crate::remote::session::RemoteSession;

/// Wrapper for a remote fixed-text (label) control.
pub struct RemoteLabel {
    core: RemoteControlCore,
}

impl RemoteLabel {
    pub fn new(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        config: FixedTextModelConfig,
    ) -> Result<Self> {
        let bounds = config.bounds;
        let core = RemoteControlCore::create(
            session,
            parent_peer,
            SERVICE_FIXED_TEXT_MODEL,
            SERVICE_FIXED_TEXT,
            |bag| config.apply(bag),
            bounds,
        )?;
        Ok(Self { core })
    }

    pub(crate) fn model_object(&self) -> &RemoteObject {
        self.core.model_object()
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        if self.core.is_disposed() {
            return Err(crate::core::Error::WidgetDisposed);
        }
        api::fixed_text(self.core.control_object())?.set_text(text)?;
        Ok(())
    }

    pub fn text(&self) -> Result<String> {
        if self.core.is_disposed() {
            return Err(crate::core::Error::WidgetDisposed);
        }
        Ok(api::fixed_text(self.core.control_object())?.text()?)
    }
}

impl RemoteControl for RemoteLabel {
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
