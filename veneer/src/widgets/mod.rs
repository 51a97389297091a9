// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The widget object model.
//!
//! Concrete widgets compose three capability traits instead of a deep
//! inheritance chain: [`Widget`] (identity, disposal, listeners),
//! [`Control`] (remote-backed geometry and visibility), and [`Container`]
//! (children and the layout protocol). Each widget owns exactly one remote
//! control wrapper, created in its constructor; constructing a child widget
//! requires the parent's remote peer to exist already.

use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) mod widget;

mod button;
mod canvas;
mod composite;
mod label;
mod progress_bar;
mod shell;
mod tab_folder;
mod text;

pub use button::Button;
pub use canvas::Canvas;
pub use composite::Composite;
pub use label::Label;
pub use progress_bar::ProgressBar;
pub use shell::Shell;
pub use tab_folder::{TabFolder, TabItem};
pub use text::Text;
pub use widget::{
    Container, ContainerRef, Control, ControlRef, Widget, WidgetHandle, WidgetId, WidgetRef,
};

#[doc(hidden)]
pub use widget::sealed;

/// Unique remote model names, since the remote service indexes controls by
/// name within a container.
pub(crate) fn control_name(prefix: &str) -> String {
    static NAME_SEQ: AtomicU64 = AtomicU64::new(1);
    let seq = NAME_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{seq}")
}
