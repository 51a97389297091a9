// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Test support for Veneer.
//!
//! Provides [`LoopbackBackend`], an in-memory implementation of the remote
//! automation boundary, and [`TestHarness`], which wires a backend, session
//! and display together for integration tests.
//!
//! The crate is not restricted to tests; the loopback backend is also how
//! the examples run without a real automation service.

#![warn(clippy::print_stdout, clippy::print_stderr)]

mod backend;
mod harness;

pub use backend::{DrawOp, LoopbackBackend};
pub use harness::TestHarness;
