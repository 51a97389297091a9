// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! A shell with one button, running against the loopback backend.
//!
//! With a real automation service the only change would be the
//! `ServiceFactory` handed to [`RemoteSession::connect`].

use std::sync::Arc;

use tracing::info;
use veneer::remote::api::RemoteInstance;
use veneer::widgets::{Button, Control, Shell, Widget};
use veneer::{Display, RemoteSession, Result, Style};
use veneer_testing::LoopbackBackend;

fn main() -> Result<()> {
    veneer::app::init_tracing();

    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend.clone()))?;
    let display = Display::new(session)?;

    let shell = Shell::new(&display)?;
    shell.set_text("Hello Veneer")?;

    let button = Button::new(&shell, Style::PUSH)?;
    button.set_text("OK")?;
    button.add_selection_listener(|_event| {
        info!("button pressed");
    })?;

    shell.open()?;

    // Stand in for a user: click the button, then close the shell.
    backend.click(button.checked_window_object()?.peer_id());
    while display.read_and_dispatch()? {}
    backend.request_close(shell.checked_window_object()?.peer_id());

    while !shell.is_disposed() {
        if !display.read_and_dispatch()? {
            display.sleep()?;
        }
    }
    display.dispose()?;
    Ok(())
}
