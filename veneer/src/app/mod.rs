// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The display and its event loop.

mod display;
mod synchronizer;
mod tracing_backend;

pub use display::{Display, DisplayOptions};
pub use tracing_backend::{init_tracing, try_init_tracing};

pub(crate) use display::{ActionGlue, MouseGlue, PaintGlue, TopWindowGlue, WindowGlue};
