// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The remote binding layer.
//!
//! [`api`] defines the traits through which the automation service is
//! consumed. [`RemoteSession`] bootstraps the connection. The wrapper types
//! ([`RemoteButton`], [`RemoteWindow`], ...) each own one remote peer and
//! translate toolkit operations into remote calls; the widget object model
//! in [`crate::widgets`] builds on them.

pub mod api;
pub mod config;
pub mod value;

mod button;
mod canvas;
mod control;
mod graphics;
mod image;
mod label;
mod progress;
mod session;
mod text;
mod window;

pub use button::RemoteButton;
pub use canvas::RemoteCanvas;
pub use control::RemoteControl;
pub use graphics::Graphics;
pub use image::RemoteImage;
pub use label::RemoteLabel;
pub use progress::RemoteProgressBar;
pub use session::RemoteSession;
pub use text::RemoteText;
pub use window::RemoteWindow;
