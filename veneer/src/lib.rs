// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Veneer maps an SWT-style widget toolkit onto a remote document-suite
//! automation service.
//!
//! Instead of a native windowing system, every widget in Veneer is backed by a
//! *remote peer*: a window or control instance owned by an automation service
//! and driven over a factory/property-set/listener boundary. Veneer provides:
//!
//! - The widget object model ([`widgets`]): [`Shell`][widgets::Shell],
//!   [`Composite`][widgets::Composite], [`Button`][widgets::Button], and
//!   friends, composed from the [`Widget`][widgets::Widget],
//!   [`Control`][widgets::Control] and [`Container`][widgets::Container]
//!   capability traits.
//! - The event loop ([`app`]): a thread-affine [`Display`][app::Display] that
//!   pumps skin updates, deferred layouts, timers and cross-thread runnables,
//!   and resolves remote callbacks back to their owning widgets.
//! - The remote binding layer ([`remote`]): session bootstrap, the
//!   automation-service interface traits, typed model configurations, and the
//!   per-control wrappers that own remote peers.
//!
//! The automation service itself is out of scope: it is consumed strictly
//! through the traits in [`remote::api`]. The `veneer_testing` crate provides
//! an in-memory implementation of that boundary for tests and examples.
//!
//! A minimal application:
//!
//! ```ignore
//! let session = RemoteSession::connect(backend)?;
//! let display = Display::new(session)?;
//! let shell = Shell::new(&display)?;
//! let button = Button::new(&shell, Style::PUSH)?;
//! button.set_text("OK")?;
//! shell.open()?;
//! while !shell.is_disposed() {
//!     if !display.read_and_dispatch()? {
//!         display.sleep()?;
//!     }
//! }
//! display.dispose()?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]

pub mod app;
pub mod core;
pub mod remote;
pub mod widgets;

pub use crate::app::{Display, DisplayOptions};
pub use crate::core::{Error, Event, EventType, Point, Rect, Result, Size, Style};
pub use crate::remote::RemoteSession;
