// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! A headless harness: loopback backend + session + display, wired together.

use std::sync::Arc;

use veneer::app::{Display, DisplayOptions};
use veneer::core::Rect;
use veneer::remote::api::{PeerId, RemoteInstance};
use veneer::remote::RemoteSession;
use veneer::widgets::Control;

use crate::backend::{DrawOp, LoopbackBackend};

/// Owns one display running against the loopback backend.
///
/// Tests drive widgets through the normal toolkit API, inject remote events
/// through the backend, [`pump`](Self::pump) the event loop, and assert
/// against the remote-side state (the source of truth).
///
/// Dropping the harness disposes the display, freeing the per-thread
/// display slot for the next harness on this thread.
pub struct TestHarness {
    backend: LoopbackBackend,
    display: Display,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_options(DisplayOptions::default())
    }

    pub fn with_options(options: DisplayOptions) -> Self {
        let backend = LoopbackBackend::new();
        let session = RemoteSession::connect(Arc::new(backend.clone()))
            .expect("loopback bootstrap cannot fail");
        let display =
            Display::new_with_options(session, options).expect("thread already owns a display");
        Self { backend, display }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn session(&self) -> &RemoteSession {
        self.display.session()
    }

    pub fn backend(&self) -> &LoopbackBackend {
        &self.backend
    }

    /// Runs event-loop ticks until the display reports no more work.
    pub fn pump(&self) {
        // The tick bound guards against a dispatch storm in a broken test.
        for _ in 0..1000 {
            if !self.display.read_and_dispatch().expect("display disposed") {
                return;
            }
        }
        panic!("display did not become idle");
    }

    /// The remote peer behind a control.
    pub fn peer_of(&self, control: &dyn Control) -> PeerId {
        control
            .checked_window_object()
            .expect("control has no realized peer")
            .peer_id()
    }

    /// Clicks a control: mouse down/up plus the action, then pumps.
    pub fn click(&self, control: &dyn Control) {
        let peer = self.peer_of(control);
        self.backend.click(peer);
        self.pump();
    }

    /// Delivers a window-manager close request to a shell, then pumps.
    pub fn request_close(&self, shell: &dyn Control) {
        let peer = self.peer_of(shell);
        self.backend.request_close(peer);
        self.pump();
    }

    /// Delivers a paint request, then pumps.
    pub fn request_paint(&self, control: &dyn Control, update_rect: Rect) {
        let peer = self.peer_of(control);
        self.backend.request_paint(peer, update_rect);
        self.pump();
    }

    /// The label property of the control's remote model.
    pub fn remote_label(&self, control: &dyn Control) -> Option<String> {
        let peer = self.peer_of(control);
        self.backend
            .peer_model_property(peer, "Label")
            .and_then(|value| value.as_str().map(str::to_owned))
    }

    pub fn remote_bounds(&self, control: &dyn Control) -> Option<Rect> {
        self.backend.peer_bounds(self.peer_of(control))
    }

    pub fn remote_visible(&self, control: &dyn Control) -> Option<bool> {
        self.backend.peer_visible(self.peer_of(control))
    }

    pub fn draw_ops(&self, control: &dyn Control) -> Vec<DrawOp> {
        self.backend.draw_ops(self.peer_of(control))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if !self.display.is_disposed() {
            let _ = self.display.dispose();
        }
    }
}
