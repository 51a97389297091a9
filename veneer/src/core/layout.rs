// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The layout protocol and two stock layouts.
//!
//! A [`Layout`] positions the children of one container. Layouts never run
//! eagerly: containers mark themselves dirty and the display flushes the
//! marks — immediately for a direct `layout()` call, or once per deferred
//! scope when batching is active.
//!
//! There is no preferred-size negotiation at this layer; the stock layouts
//! treat each child's current remote bounds as its wanted size.

use crate::core::{Rect, Result, Size};
use crate::widgets::{Container, Control};

/// A strategy positioning the children of a container.
pub trait Layout: Send {
    /// The size the container wants, given optional hints.
    fn compute_size(
        &mut self,
        composite: &dyn Container,
        w_hint: Option<i32>,
        h_hint: Option<i32>,
        flush_cache: bool,
    ) -> Result<Size>;

    /// Discards cached data about `control`. Returns `true` when the cache
    /// for the remaining children is still valid.
    fn flush_cache(&mut self, _control: &dyn Control) -> bool {
        true
    }

    /// Positions the container's children inside its client area.
    fn layout(&mut self, composite: &dyn Container, flush_cache: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

// --- MARK: FILL LAYOUT

/// Tiles children into equal cells along one axis.
#[derive(Debug, Clone)]
pub struct FillLayout {
    pub orientation: Orientation,
    pub margin_width: i32,
    pub margin_height: i32,
    pub spacing: i32,
}

impl FillLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            margin_width: 0,
            margin_height: 0,
            spacing: 0,
        }
    }
}

impl Default for FillLayout {
    fn default() -> Self {
        Self::new(Orientation::Horizontal)
    }
}

impl Layout for FillLayout {
    fn compute_size(
        &mut self,
        composite: &dyn Container,
        w_hint: Option<i32>,
        h_hint: Option<i32>,
        _flush_cache: bool,
    ) -> Result<Size> {
        let children = composite.children()?;
        let count = i32::try_from(children.len()).unwrap_or(i32::MAX);
        let mut max_width = 0;
        let mut max_height = 0;
        for child in &children {
            let size = child.size()?;
            max_width = max_width.max(size.width);
            max_height = max_height.max(size.height);
        }
        let (mut width, mut height) = match self.orientation {
            Orientation::Horizontal => (
                max_width * count + self.spacing * (count - 1).max(0),
                max_height,
            ),
            Orientation::Vertical => (
                max_width,
                max_height * count + self.spacing * (count - 1).max(0),
            ),
        };
        width += 2 * self.margin_width;
        height += 2 * self.margin_height;
        Ok(Size::new(w_hint.unwrap_or(width), h_hint.unwrap_or(height)))
    }

    fn layout(&mut self, composite: &dyn Container, _flush_cache: bool) -> Result<()> {
        let children = composite.children()?;
        if children.is_empty() {
            return Ok(());
        }
        let area = composite.client_area()?;
        let count = i32::try_from(children.len()).unwrap_or(i32::MAX);
        let usable_width = area.width - 2 * self.margin_width;
        let usable_height = area.height - 2 * self.margin_height;
        match self.orientation {
            Orientation::Horizontal => {
                let cell = (usable_width - self.spacing * (count - 1)).max(0) / count;
                let mut x = area.x + self.margin_width;
                for child in &children {
                    child.set_bounds(Rect::new(
                        x,
                        area.y + self.margin_height,
                        cell,
                        usable_height.max(0),
                    ))?;
                    x += cell + self.spacing;
                }
            }
            Orientation::Vertical => {
                let cell = (usable_height - self.spacing * (count - 1)).max(0) / count;
                let mut y = area.y + self.margin_height;
                for child in &children {
                    child.set_bounds(Rect::new(
                        area.x + self.margin_width,
                        y,
                        usable_width.max(0),
                        cell,
                    ))?;
                    y += cell + self.spacing;
                }
            }
        }
        Ok(())
    }
}

// --- MARK: ROW LAYOUT

/// Places children in a row, wrapping when the client area runs out.
///
/// Children keep their own sizes.
#[derive(Debug, Clone)]
pub struct RowLayout {
    pub margin_width: i32,
    pub margin_height: i32,
    pub spacing: i32,
    pub wrap: bool,
}

impl RowLayout {
    pub fn new() -> Self {
        Self {
            margin_width: 3,
            margin_height: 3,
            spacing: 3,
            wrap: true,
        }
    }
}

impl Default for RowLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for RowLayout {
    fn compute_size(
        &mut self,
        composite: &dyn Container,
        w_hint: Option<i32>,
        h_hint: Option<i32>,
        _flush_cache: bool,
    ) -> Result<Size> {
        let children = composite.children()?;
        let mut width = 0;
        let mut height = 0;
        for child in &children {
            let size = child.size()?;
            if width > 0 {
                width += self.spacing;
            }
            width += size.width;
            height = height.max(size.height);
        }
        width += 2 * self.margin_width;
        height += 2 * self.margin_height;
        Ok(Size::new(w_hint.unwrap_or(width), h_hint.unwrap_or(height)))
    }

    fn layout(&mut self, composite: &dyn Container, _flush_cache: bool) -> Result<()> {
        let children = composite.children()?;
        if children.is_empty() {
            return Ok(());
        }
        let area = composite.client_area()?;
        let limit = area.x + area.width - self.margin_width;
        let mut x = area.x + self.margin_width;
        let mut y = area.y + self.margin_height;
        let mut row_height = 0;
        for child in &children {
            let size = child.size()?;
            if self.wrap && x > area.x + self.margin_width && x + size.width > limit {
                x = area.x + self.margin_width;
                y += row_height + self.spacing;
                row_height = 0;
            }
            child.set_bounds(Rect::new(x, y, size.width, size.height))?;
            x += size.width + self.spacing;
            row_height = row_height.max(size.height);
        }
        Ok(())
    }
}
