// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::core::Result;
use crate::remote::api::{
    self, ActionListener, MouseListener, RemoteObject, SERVICE_BUTTON, SERVICE_BUTTON_MODEL,
};
use crate::remote::config::ButtonModelConfig;
use crate::remote::control::{RemoteControl, RemoteControlCore};
use crate::remote::session::RemoteSession;

/// Wrapper for a remote push-button control.
pub struct RemoteButton {
    core: RemoteControlCore,
}

impl std::fmt::Debug for RemoteButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteButton").finish_non_exhaustive()
    }
}

impl RemoteButton {
    pub fn new(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        config: ButtonModelConfig,
    ) -> Result<Self> {
        let bounds = config.bounds;
        let core = RemoteControlCore::create(
            session,
            parent_peer,
            SERVICE_BUTTON_MODEL,
            SERVICE_BUTTON,
            |bag| config.apply(bag),
            bounds,
        )?;
        Ok(Self { core })
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        if self.core.is_disposed() {
            return Err(crate::core::Error::WidgetDisposed);
        }
        api::button(self.core.control_object())?.set_label(text)?;
        Ok(())
    }

    /// Reads the label back from the remote model.
    pub fn text(&self) -> Result<String> {
        if self.core.is_disposed() {
            return Err(crate::core::Error::WidgetDisposed);
        }
        let value = api::property_set(self.core.model_object())?.property_value("Label")?;
        Ok(value.as_str().unwrap_or_default().to_owned())
    }

    pub(crate) fn model_object(&self) -> &RemoteObject {
        self.core.model_object()
    }

    pub fn add_action_listener(&self, listener: Arc<dyn ActionListener>) -> Result<()> {
        api::button(self.core.control_object())?.add_action_listener(listener)?;
        Ok(())
    }

    pub fn add_mouse_listener(&self, listener: Arc<dyn MouseListener>) -> Result<()> {
        let window = self.core.window_object()?;
        api::window(&window)?.add_mouse_listener(listener)?;
        Ok(())
    }
}

impl RemoteControl for RemoteButton {
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
