// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Shared machinery for remote control wrappers.
//!
//! A wrapper owns exactly one remote peer and translates toolkit geometry
//! operations into remote calls. There is deliberately no local geometry
//! cache: every read is a round trip, so the remote state stays the single
//! source of truth.

use crate::core::{Point, Rect, Result};
use crate::remote::api::{
    self, PosSizeFlags, RemoteObject, ServiceFactory,
};
use crate::remote::session::RemoteSession;

/// Operations common to every remote control wrapper.
///
/// `window_object` locates the wrapper's realized peer; the provided methods
/// build the geometry contract on top of it. All of them fail with
/// [`Error::WidgetDisposed`](crate::core::Error::WidgetDisposed) once the
/// wrapper is disposed — a disposed wrapper never dereferences its peer.
pub trait RemoteControl {
    /// The remote object carrying the window interfaces of this wrapper's
    /// realized peer.
    fn window_object(&self) -> Result<RemoteObject>;

    /// The realized peer object used as parent for child peer creation.
    fn peer_object(&self) -> Result<RemoteObject> {
        self.window_object()
    }

    /// The parent wrapper's peer this control was created against; `None`
    /// for top-level windows.
    fn parent_peer(&self) -> Option<&RemoteObject>;

    fn is_disposed(&self) -> bool;

    /// Marks the wrapper disposed. Implementations only flip their flag; the
    /// remote side is released by [`dispose`](Self::dispose).
    fn mark_disposed(&mut self);

    fn bounds(&self) -> Result<Rect> {
        let window = self.window_object()?;
        Ok(api::window(&window)?.pos_size()?)
    }

    fn set_bounds(&self, bounds: Rect) -> Result<()> {
        let window = self.window_object()?;
        api::window(&window)?.set_pos_size(
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            PosSizeFlags::POSSIZE,
        )?;
        Ok(())
    }

    /// Read-modify-write: the full bounds are re-issued with only the origin
    /// replaced. Safe because all calls originate from the display thread.
    fn set_location(&self, x: i32, y: i32) -> Result<()> {
        let current = self.bounds()?;
        self.set_bounds(Rect::new(x, y, current.width, current.height))
    }

    fn set_size(&self, width: i32, height: i32) -> Result<()> {
        let current = self.bounds()?;
        self.set_bounds(Rect::new(current.x, current.y, width, height))
    }

    fn location(&self) -> Result<Point> {
        Ok(self.bounds()?.location())
    }

    fn set_visible(&self, visible: bool) -> Result<()> {
        let window = self.window_object()?;
        api::window(&window)?.set_visible(visible)?;
        Ok(())
    }

    fn is_visible(&self) -> Result<bool> {
        let window = self.window_object()?;
        Ok(api::window(&window)?.visible()?)
    }

    /// Disposes the remote peer. Idempotent: the second and later calls
    /// return without touching the remote side.
    fn dispose(&mut self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let window = self.window_object()?;
        api::window(&window)?.dispose()?;
        self.mark_disposed();
        Ok(())
    }
}

/// The model/control/peer triple behind a factory-created control.
///
/// Construction follows the remote service's recipe: create the model, set
/// its properties, create the control, bind the model, then realize the peer
/// against the parent's peer. The parent peer must already exist.
pub(crate) struct RemoteControlCore {
    control: RemoteObject,
    model: RemoteObject,
    parent_peer: RemoteObject,
    disposed: bool,
}

impl RemoteControlCore {
    pub(crate) fn create(
        session: &RemoteSession,
        parent_peer: &RemoteObject,
        model_service: &str,
        control_service: &str,
        configure: impl FnOnce(&dyn api::PropertySet) -> std::result::Result<(), api::RemoteCallError>,
        bounds: Rect,
    ) -> Result<Self> {
        let factory: &dyn ServiceFactory = &**session.factory();

        let model = factory.create_instance(model_service)?;
        configure(api::property_set(&model)?)?;

        let control = factory.create_instance(control_service)?;
        let control_iface = api::control(&control)?;
        control_iface.set_model(&model)?;

        let toolkit = session.toolkit()?;
        control_iface.create_peer(&toolkit, Some(parent_peer))?;

        let core = Self {
            control,
            model,
            parent_peer: parent_peer.clone(),
            disposed: false,
        };

        // Some peer classes ignore the model position; push it again through
        // the window, then show the peer.
        let window = core.window_object()?;
        api::window(&window)?.set_pos_size(
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            PosSizeFlags::POSSIZE,
        )?;
        api::window(&window)?.set_visible(true)?;

        Ok(core)
    }

    pub(crate) fn control_object(&self) -> &RemoteObject {
        &self.control
    }

    pub(crate) fn model_object(&self) -> &RemoteObject {
        &self.model
    }
}

impl RemoteControl for RemoteControlCore {
    fn window_object(&self) -> Result<RemoteObject> {
        if self.disposed {
            return Err(crate::core::Error::WidgetDisposed);
        }
        Ok(api::control(&self.control)?.peer()?)
    }

    fn parent_peer(&self) -> Option<&RemoteObject> {
        Some(&self.parent_peer)
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}
