// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Rect, Result};
use crate::remote::api::{self, RemoteObject};
use crate::remote::value::Color;

/// A remote graphics context obtained from a window's device interface.
#[derive(Clone)]
pub struct Graphics {
    object: RemoteObject,
}

impl Graphics {
    pub(crate) fn new(object: RemoteObject) -> Self {
        Self { object }
    }

    pub fn set_line_color(&self, color: Color) -> Result<()> {
        api::graphics(&self.object)?.set_line_color(color.value())?;
        Ok(())
    }

    pub fn set_fill_color(&self, color: Color) -> Result<()> {
        api::graphics(&self.object)?.set_fill_color(color.value())?;
        Ok(())
    }

    pub fn draw_rect(&self, rect: Rect) -> Result<()> {
        api::graphics(&self.object)?.draw_rect(rect.x, rect.y, rect.width, rect.height)?;
        Ok(())
    }

    pub fn draw_ellipse(&self, rect: Rect) -> Result<()> {
        api::graphics(&self.object)?.draw_ellipse(rect.x, rect.y, rect.width, rect.height)?;
        Ok(())
    }

    /// Fills a rectangle by setting both colors and drawing.
    pub fn fill_rectangle(&self, rect: Rect, color: Color) -> Result<()> {
        let graphics = api::graphics(&self.object)?;
        graphics.set_fill_color(color.value())?;
        graphics.set_line_color(color.value())?;
        graphics.draw_rect(rect.x, rect.y, rect.width, rect.height)?;
        Ok(())
    }
}
