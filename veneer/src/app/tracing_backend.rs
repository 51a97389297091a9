// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Configures a suitable default [`tracing`] implementation for a Veneer
//! application.
//!
//! Uses a default filter which can be overwritten with `RUST_LOG`: all
//! [`DEBUG`](tracing::Level::DEBUG) messages in debug mode, all
//! [`INFO`](tracing::Level::INFO) messages in release mode.
//!
//! If a `tracing` backend is already configured, this will not overwrite it.

use std::error::Error;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initializes the default tracing subscriber, reporting failure to the
/// caller (for example when another subscriber is already installed).
pub fn try_init_tracing() -> Result<(), Box<dyn Error>> {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();
    let console_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()?;
    Ok(())
}

/// Initializes the default tracing subscriber, panicking on failure.
pub fn init_tracing() {
    try_init_tracing().expect("failed to initialize tracing");
}
