// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::Result;
use crate::remote::api::{self, RemoteObject, SERVICE_IMAGE_CONTROL_MODEL, ServiceFactory};
use crate::remote::config::ImageModelConfig;
use crate::remote::session::RemoteSession;

/// Wrapper for a remote image-control model.
///
/// Only the model exists at this layer; the image control is never realized
/// as a peer of its own.
pub struct RemoteImage {
    model: RemoteObject,
}

impl RemoteImage {
    pub fn new(session: &RemoteSession, config: ImageModelConfig) -> Result<Self> {
        let factory: &dyn ServiceFactory = &**session.factory();
        let model = factory.create_instance(SERVICE_IMAGE_CONTROL_MODEL)?;
        config.apply(api::property_set(&model)?)?;
        Ok(Self { model })
    }

    pub fn model_object(&self) -> &RemoteObject {
        &self.model
    }

    /// Resizes the model.
    pub fn init_with_size(self, width: i32, height: i32) -> Result<Self> {
        let bag = api::property_set(&self.model)?;
        bag.set_property_value("Height", height.into())?;
        bag.set_property_value("Width", width.into())?;
        Ok(self)
    }
}
