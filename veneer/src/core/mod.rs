// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Shared toolkit vocabulary: errors, events, geometry, style bits and the
//! layout protocol.

mod error;
mod event;
mod geometry;
mod layout;
mod style;

pub use error::{Error, Result};
pub use event::{Event, EventType, Listener};
pub use geometry::{Point, Rect, Size};
pub use layout::{FillLayout, Layout, Orientation, RowLayout};
pub use style::{LayoutFlags, Style};

pub(crate) use event::EventTable;
