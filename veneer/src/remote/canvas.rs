// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use crate::core::{Rect, Result};
use crate::remote::api::{self, RemoteObject};
use crate::remote::control::RemoteControl;
use crate::remote::graphics::Graphics;
use crate::remote::session::RemoteSession;
use crate::remote::window::RemoteWindow;

/// Wrapper for a drawable container window.
///
/// The graphics context is created lazily from the window's device interface
/// and cached for the wrapper's lifetime.
pub struct RemoteCanvas {
    window: RemoteWindow,
    graphics: Option<RemoteObject>,
}

impl RemoteCanvas {
    pub fn new(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        bounds: Rect,
    ) -> Result<Self> {
        let window = RemoteWindow::new_container(session, parent_peer, bounds)?;
        Ok(Self {
            window,
            graphics: None,
        })
    }

    pub fn window(&self) -> &RemoteWindow {
        &self.window
    }

    pub fn graphics(&mut self) -> Result<Graphics> {
        if let Some(object) = &self.graphics {
            return Ok(Graphics::new(object.clone()));
        }
        let window = self.window.window_object()?;
        let object = api::device(&window)?.create_graphics()?;
        self.graphics = Some(object.clone());
        Ok(Graphics::new(object))
    }
}

impl RemoteControl for RemoteCanvas {
    fn window_object(&self) -> Result<RemoteObject> {
        self.window.window_object()
    }

    fn parent_peer(&self) -> Option<&RemoteObject> {
        self.window.parent_peer()
    }

    fn is_disposed(&self) -> bool {
        self.window.is_disposed()
    }

    fn mark_disposed(&mut self) {
        self.graphics = None;
        self.window.mark_disposed();
    }
}
