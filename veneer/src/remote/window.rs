// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::core::{Error, Rect, Result};
use crate::remote::api::{
    self, InvalidateFlags, MouseListener, PaintListener, RemoteObject, TopWindowListener,
    WindowAttributes, WindowClass, WindowDescriptor, WindowListener, WINDOW_SERVICE_NAME,
};
use crate::remote::control::RemoteControl;
use crate::remote::session::RemoteSession;

/// Wrapper for a toolkit-created window peer.
///
/// Used both for top-level shells (class `Top`, no parent) and for the
/// container windows backing composites (class `Container`, parented).
pub struct RemoteWindow {
    window: RemoteObject,
    parent_peer: Option<RemoteObject>,
    disposed: bool,
}

impl RemoteWindow {
    /// Creates a top-level window peer. It starts hidden; shells become
    /// visible when opened.
    pub fn new_top_level(session: &RemoteSession, bounds: Rect) -> Result<Self> {
        let descriptor = WindowDescriptor {
            class: WindowClass::Top,
            service_name: WINDOW_SERVICE_NAME,
            parent: None,
            bounds,
            attributes: WindowAttributes::BORDER
                | WindowAttributes::MOVEABLE
                | WindowAttributes::SIZEABLE
                | WindowAttributes::CLOSEABLE,
        };
        let toolkit = session.toolkit()?;
        let window = api::toolkit(&toolkit)?.create_window(&descriptor)?;
        api::window(&window)?.set_visible(false)?;
        Ok(Self {
            window,
            parent_peer: None,
            disposed: false,
        })
    }

    /// Creates a container window peer parented to an existing peer. The
    /// parent peer must already be realized.
    pub fn new_container(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        bounds: Rect,
    ) -> Result<Self> {
        let descriptor = WindowDescriptor {
            class: WindowClass::Container,
            service_name: WINDOW_SERVICE_NAME,
            parent: Some(parent_peer.clone()),
            bounds,
            attributes: WindowAttributes::BORDER,
        };
        let toolkit = session.toolkit()?;
        let window = api::toolkit(&toolkit)?.create_window(&descriptor)?;
        api::peer(&window)?.invalidate(InvalidateFlags::NOERASE)?;
        api::window(&window)?.set_visible(true)?;
        Ok(Self {
            window,
            parent_peer: Some(parent_peer.clone()),
            disposed: false,
        })
    }

    pub fn add_window_listener(&self, listener: Arc<dyn WindowListener>) -> Result<()> {
        let window = self.window_object()?;
        api::window(&window)?.add_window_listener(listener)?;
        Ok(())
    }

    /// Only top-level windows carry the top-window interface.
    pub fn add_top_window_listener(&self, listener: Arc<dyn TopWindowListener>) -> Result<()> {
        let window = self.window_object()?;
        api::top_window(&window)?.add_top_window_listener(listener)?;
        Ok(())
    }

    pub fn add_mouse_listener(&self, listener: Arc<dyn MouseListener>) -> Result<()> {
        let window = self.window_object()?;
        api::window(&window)?.add_mouse_listener(listener)?;
        Ok(())
    }

    pub fn add_paint_listener(&self, listener: Arc<dyn PaintListener>) -> Result<()> {
        let window = self.window_object()?;
        api::window(&window)?.add_paint_listener(listener)?;
        Ok(())
    }

    pub fn invalidate(&self, flags: InvalidateFlags) -> Result<()> {
        let window = self.window_object()?;
        api::peer(&window)?.invalidate(flags)?;
        Ok(())
    }
}

impl RemoteControl for RemoteWindow {
    /// The toolkit-created object is window and peer at once.
    fn window_object(&self) -> Result<RemoteObject> {
        if self.disposed {
            return Err(Error::WidgetDisposed);
        }
        Ok(self.window.clone())
    }

    fn parent_peer(&self) -> Option<&RemoteObject> {
        self.parent_peer.as_ref()
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}
