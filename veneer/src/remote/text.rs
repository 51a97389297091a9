// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Error, Result};
use crate::remote::api::{self, RemoteObject, SERVICE_EDIT, SERVICE_EDIT_MODEL};
use crate::remote::config::EditModelConfig;
use crate::remote::control::{RemoteControl, RemoteControlCore};
use crate::remote::session::RemoteSession;
use crate::remote::value::FontDescriptor;

/// Wrapper for a remote edit (text field) control.
pub struct RemoteText {
    core: RemoteControlCore,
}

impl RemoteText {
    pub fn new(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        mut config: EditModelConfig,
    ) -> Result<Self> {
        if config.font.is_none() {
            config.font = Some(FontDescriptor::default());
        }
        let bounds = config.bounds;
        let core = RemoteControlCore::create(
            session,
            parent_peer,
            SERVICE_EDIT_MODEL,
            SERVICE_EDIT,
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
            return Err(Error::WidgetDisposed);
        }
        api::text_component(self.core.control_object())?.set_text(text)?;
        Ok(())
    }

    pub fn text(&self) -> Result<String> {
        if self.core.is_disposed() {
            return Err(Error::WidgetDisposed);
        }
        Ok(api::text_component(self.core.control_object())?.text()?)
    }

    pub fn set_font(&self, font: FontDescriptor) -> Result<()> {
        if self.core.is_disposed() {
            return Err(Error::WidgetDisposed);
        }
        api::property_set(self.core.model_object())?
            .set_property_value("FontDescriptor", font.into())?;
        Ok(())
    }

    pub fn font(&self) -> Result<FontDescriptor> {
        if self.core.is_disposed() {
            return Err(Error::WidgetDisposed);
        }
        let value =
            api::property_set(self.core.model_object())?.property_value("FontDescriptor")?;
        value
            .as_font()
            .cloned()
            .ok_or(Error::Unsupported("model has no font descriptor"))
    }
}

impl RemoteControl for RemoteText {
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
